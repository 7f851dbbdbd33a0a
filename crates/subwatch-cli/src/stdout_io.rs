use std::io::{self, Write};

pub fn write_stdout_text(text: &str) -> io::Result<()> {
    write_tolerating_closed_pipe(&mut io::stdout().lock(), text, false)
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    write_tolerating_closed_pipe(&mut io::stdout().lock(), text, true)
}

/// A reader that hangs up early (`subwatch detect rows.csv | head`) is not an error.
fn write_tolerating_closed_pipe(
    writer: &mut dyn Write,
    text: &str,
    newline: bool,
) -> io::Result<()> {
    let written = writer
        .write_all(text.as_bytes())
        .and_then(|()| {
            if newline {
                writer.write_all(b"\n")
            } else {
                Ok(())
            }
        })
        .and_then(|()| writer.flush());

    match written {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
