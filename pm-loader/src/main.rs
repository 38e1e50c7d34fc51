use power_object::config::SleepConfig;

#[async_std::main]
async fn main() {
    env_logger::init();
    kernel_hal::init();

    let cmdline = std::env::args().nth(1).unwrap_or_default();
    let config = match SleepConfig::from_cmdline(&cmdline) {
        Ok(config) => config,
        Err(err) => {
            println!("Usage: pm-loader [CMDLINE]");
            println!("invalid cmdline {:?}: {}", cmdline, err);
            std::process::exit(-1);
        }
    };
    if let Some(level) = config.log_level.as_deref() {
        pm_loader::set_max_level(level);
    }

    match pm_loader::run(&cmdline).await {
        Ok(report) => {
            println!("{}", report);
            if report.result.is_err() {
                std::process::exit(1);
            }
        }
        Err(err) => {
            println!("invalid scenario {:?}: {}", cmdline, err);
            std::process::exit(-1);
        }
    }
}
