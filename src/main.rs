use adb_host_client::adb::{AdbClient, AdbError, AdbResult, PROCESS_NOT_RUNNING};
use adb_host_client::args::{Args, Command};

fn main() {
    let Some(args) = Args::parse() else {
        return;
    };

    let default_level = if args.debug_mode { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(args)) {
        eprintln!("❌ {e}");
        if e.is_connection_failure() {
            eprintln!("💡 Start the server with 'adb start-server' or pass --port=N");
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> AdbResult<()> {
    let client = AdbClient::new(args.config());

    match &args.command {
        Command::Devices => {
            let devices = client.list_devices().await?;
            if devices.is_empty() {
                println!("No devices found");
            }
            for device in devices {
                let props: Vec<String> = device
                    .properties
                    .iter()
                    .map(|(k, v)| format!("{k}:{v}"))
                    .collect();
                println!("{}\t{:?}\t{}", device.serial, device.state, props.join(" "));
            }
        }
        Command::Version => {
            println!("{}", client.server_version().await?);
        }
        Command::Shell(cmd) => {
            let serial = resolve_serial(&client, &args).await?;
            print!("{}", client.shell_output(&serial, cmd).await?);
        }
        Command::GetProp(name) => {
            let serial = resolve_serial(&client, &args).await?;
            println!("{}", client.get_property(&serial, name).await?);
        }
        Command::ApiLevel => {
            let serial = resolve_serial(&client, &args).await?;
            println!("{}", client.get_api_level(&serial).await?);
        }
        Command::Pid(package) => {
            let serial = resolve_serial(&client, &args).await?;
            let pid = client.get_process_id(package, &serial).await?;
            if pid == PROCESS_NOT_RUNNING {
                println!("{package} is not running");
            }
            println!("{pid}");
        }
        Command::Wake => {
            let serial = resolve_serial(&client, &args).await?;
            client.turn_on_display(&serial).await?;
        }
        Command::Unlock(pin) => {
            let serial = resolve_serial(&client, &args).await?;
            client.unlock(&serial, pin).await?;
        }
        Command::Install(path) => {
            let serial = resolve_serial(&client, &args).await?;
            let mut file = tokio::fs::File::open(path).await?;
            client.install_package(&serial, &mut file).await?;
            println!("✅ Installed {path} on {serial}");
        }
    }
    Ok(())
}

/// `--serial` / `ANDROID_SERIAL`, otherwise the first online device.
async fn resolve_serial(client: &AdbClient, args: &Args) -> AdbResult<String> {
    if let Some(serial) = &args.serial {
        return Ok(serial.clone());
    }
    client
        .list_devices()
        .await?
        .into_iter()
        .find(|d| d.state.is_online())
        .map(|d| d.serial)
        .ok_or_else(|| AdbError::InvalidArgument {
            description: "No online devices found; pass --serial=S".to_string(),
        })
}
