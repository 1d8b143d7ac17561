use std::env;
use std::time::Duration;

use crate::adb::AdbConfig;

pub const SERIAL_ENV: &str = "ANDROID_SERIAL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Devices,
    Version,
    Shell(String),
    GetProp(String),
    ApiLevel,
    Pid(String),
    Wake,
    Unlock(String),
    Install(String),
}

#[derive(Debug)]
pub struct Args {
    pub command: Command,
    pub serial: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub debug_mode: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args)
    }

    pub fn parse_from(args: &[String]) -> Option<Self> {
        let mut serial: Option<String> = None;
        let mut port: Option<u16> = None;
        let mut timeout_secs: Option<u64> = None;
        let mut debug_mode: bool = false;
        let mut positional: Vec<&str> = Vec::new();

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("ADB Host Client v{}", env!("CARGO_PKG_VERSION"));
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if let Some(val) = arg.strip_prefix("--serial=") {
                serial = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--port=") {
                match val.parse::<u16>() {
                    Ok(p) => port = Some(p),
                    Err(_) => {
                        eprintln!("❌ Invalid port value: {}", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<u64>() {
                    Ok(secs) => timeout_secs = Some(secs),
                    Err(_) => {
                        eprintln!("❌ Invalid timeout value: {}", val);
                        return None;
                    }
                }
            } else if arg.starts_with("--") {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            } else {
                positional.push(arg.as_str());
            }
        }

        let command = match parse_command(&positional) {
            Ok(command) => command,
            Err(msg) => {
                eprintln!("❌ {}", msg);
                print_help();
                return None;
            }
        };

        Some(Args {
            command,
            serial: serial.or_else(|| env::var(SERIAL_ENV).ok().filter(|s| !s.is_empty())),
            port,
            timeout_secs,
            debug_mode,
        })
    }

    /// Environment defaults with command line overrides applied.
    pub fn config(&self) -> AdbConfig {
        let mut config = AdbConfig::from_env();
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

fn parse_command(positional: &[&str]) -> Result<Command, String> {
    let (name, rest) = match positional.split_first() {
        Some((name, rest)) => (*name, rest),
        None => return Ok(Command::Devices),
    };
    let one = |what: &str| -> Result<String, String> {
        match rest {
            [value] => Ok(value.to_string()),
            _ => Err(format!("'{name}' expects exactly one {what}")),
        }
    };
    match name {
        "devices" => Ok(Command::Devices),
        "version" => Ok(Command::Version),
        "api-level" => Ok(Command::ApiLevel),
        "wake" => Ok(Command::Wake),
        "shell" if !rest.is_empty() => Ok(Command::Shell(rest.join(" "))),
        "shell" => Err("'shell' expects a command".to_string()),
        "getprop" => one("property name").map(Command::GetProp),
        "pid" => one("package").map(Command::Pid),
        "unlock" => one("pin").map(Command::Unlock),
        "install" => one("apk path").map(Command::Install),
        other => Err(format!("Unknown command: {other}")),
    }
}

fn print_help() {
    println!("🤖 ADB Host Client");
    println!();
    println!("USAGE:");
    println!("    adb-host [FLAGS] [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    devices             List attached devices (default)");
    println!("    version             Show the adb server's protocol version");
    println!("    shell <cmd...>      Run a shell command and print its output");
    println!("    getprop <name>      Print a device property");
    println!("    api-level           Print the device API level");
    println!("    pid <package>       Print the pid of a package (-1 if not running)");
    println!("    wake                Turn on the display and swipe up");
    println!("    unlock <pin>        Type the PIN and press Enter");
    println!("    install <apk>       Stream an APK to 'cmd package install'");
    println!();
    println!("FLAGS:");
    println!("    --serial=S          Target device (default: $ANDROID_SERIAL, then first device)");
    println!("    --port=N            adb server port (default: $ANDROID_ADB_SERVER_PORT or 5037)");
    println!("    --timeout=N         I/O timeout in seconds (default: 10)");
    println!("    --debug             Enable debug logging");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    adb-host devices");
    println!("    adb-host --serial=emulator-5554 pid com.example.app");
    println!("    adb-host install app-debug.apk");
}
