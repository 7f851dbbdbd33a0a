pub mod subscription_testkit;
