use std::{path::PathBuf, process, time::Duration};

use log::error;
use mcstatus::{Charset, ModernPingData, PingOptions};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "mcstatus", about = "Query a Minecraft server with the Server List Ping protocol")]
struct Opt {
    /// Host name or IP address of the server.
    hostname: String,

    #[structopt(short, long, default_value = "25565")]
    port: u16,

    /// Connect timeout in milliseconds; 0 waits indefinitely.
    #[structopt(short, long, default_value = "2000")]
    timeout: u64,

    /// Encoding of the status JSON.
    #[structopt(short, long, default_value = "UTF-8")]
    charset: Charset,

    /// Protocol version sent in the handshake.
    #[structopt(long, default_value = "4")]
    protocol: i32,

    /// Read and write timeout in milliseconds once connected.
    #[structopt(long)]
    read_timeout: Option<u64>,

    /// Resolve `_minecraft._tcp` SRV records first.
    #[structopt(long)]
    srv: bool,

    /// Print the decoded reply as JSON.
    #[structopt(long)]
    json: bool,

    /// Write the server icon to this file.
    #[structopt(long, parse(from_os_str))]
    favicon: Option<PathBuf>,
}

impl Opt {
    fn ping_options(&self) -> PingOptions {
        PingOptions::new(self.hostname.clone())
            .with_port(self.port)
            .with_timeout(Duration::from_millis(self.timeout))
            .with_charset(self.charset)
            .with_protocol_version(self.protocol)
            .with_read_timeout(self.read_timeout.map(Duration::from_millis))
            .with_srv_lookup(self.srv)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opt = Opt::from_args();
    if let Err(e) = run(&opt) {
        error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(opt: &Opt) -> Result<(), Box<dyn std::error::Error>> {
    let data = mcstatus::ping_with_latency(&opt.ping_options())?;

    if opt.json {
        println!("{}", colored_json::to_colored_json_auto(&serde_json::to_value(&data.reply)?)?);
    } else {
        print_summary(&data);
    }

    if let Some(path) = &opt.favicon {
        match data.reply.favicon_png()? {
            Some(png) => std::fs::write(path, png)?,
            None => eprintln!("server sent no favicon"),
        }
    }
    Ok(())
}

fn print_summary(data: &ModernPingData) {
    let reply = &data.reply;
    println!("{}", reply.description);
    println!("version: {} (protocol {})", reply.version.name, reply.version.protocol);
    println!("players: {}/{}", reply.players.online, reply.players.max);
    for player in &reply.players.sample {
        println!("  - {} ({})", player.name, player.id);
    }
    println!("latency: {} ms", data.latency.as_millis());
}
