use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pcap_file::pcap::{PcapHeader, PcapPacket, PcapWriter};
use pcap_file::DataLink;
use tabled::{Table, Tabled};

use known_beacons::config::Config;
use known_beacons::extension::{ChannelKey, Extension};
use known_beacons::wireless::{parse_ieee80211, parse_radiotap, ManagementFrame};
use known_beacons::KnownBeacons;

#[derive(Parser)]
#[command(name = "known-beacons")]
#[command(author, version, about = "Known beacons generator for rogue AP assessments")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the beacons and list them
    List,

    /// Generate the beacons and write them to a radiotap pcap file
    Dump {
        /// Output pcap file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print a commented default configuration
    GenConfig {
        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Tabled)]
struct BeaconRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Bytes")]
    len: usize,
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default()?,
    };
    Ok(config)
}

pub fn run_command(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::List => cmd_list(config),
        Commands::Dump { output } => cmd_dump(config, output),
        Commands::GenConfig { output } => cmd_gen_config(output),
    }
}

/// Drive the generator the way the engine does: one received frame
fn generate(config: &Config) -> (Vec<Vec<u8>>, Vec<String>, Vec<u8>) {
    let mut generator = KnownBeacons::from_config(config);
    let frames = generator
        .get_packet(&[])
        .get(&ChannelKey::All)
        .cloned()
        .unwrap_or_default();
    (frames, generator.status_message(), generator.interesting_channels())
}

fn cmd_list(config: Config) -> Result<()> {
    let (frames, status, channels) = generate(&config);

    for msg in &status {
        println!("{}", msg.green().bold());
    }
    if frames.is_empty() {
        println!("{} no beacons generated", "Note:".yellow().bold());
        return Ok(());
    }

    let rows: Vec<BeaconRow> = frames
        .iter()
        .enumerate()
        .filter_map(|(i, bytes)| {
            let (_, offset) = parse_radiotap(bytes)?;
            let frame = parse_ieee80211(&bytes[offset..])?;
            let ManagementFrame::Beacon(beacon) = &frame.body else {
                return None;
            };
            Some(BeaconRow {
                index: i + 1,
                ssid: beacon.ssid.clone(),
                bssid: frame.bssid().to_string(),
                channel: beacon.channel.map(|c| c.to_string()).unwrap_or_default(),
                len: bytes.len(),
            })
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("Interesting channels: {:?}", channels);
    Ok(())
}

fn cmd_dump(config: Config, output: PathBuf) -> Result<()> {
    let (frames, status, _) = generate(&config);

    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let header = PcapHeader {
        datalink: DataLink::IEEE802_11_RADIOTAP,
        ..Default::default()
    };
    let mut writer = PcapWriter::with_header(BufWriter::new(file), header)
        .context("Failed to write pcap header")?;

    for (i, bytes) in frames.iter().enumerate() {
        // Space the beacons one beacon interval apart
        let ts = Duration::from_micros(i as u64 * 102_400);
        writer
            .write_packet(&PcapPacket::new(ts, bytes.len() as u32, bytes))
            .context("Failed to write packet")?;
    }
    writer
        .into_writer()
        .flush()
        .with_context(|| format!("Failed to write {}", output.display()))?;

    for msg in &status {
        println!("{}", msg.green().bold());
    }
    println!("Wrote {} beacons to {}", frames.len(), output.display());
    Ok(())
}

fn cmd_gen_config(output: Option<PathBuf>) -> Result<()> {
    let content = Config::default_with_comments();
    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pcap_file::pcap::PcapReader;

    fn config_with_ssids(file: &tempfile::NamedTempFile) -> Config {
        let mut config = Config::default();
        config.known_beacons.enabled = true;
        config.known_beacons.ssid_file = file.path().to_path_buf();
        config.ap.target_channel = 11;
        config
    }

    #[test]
    fn test_dump_writes_radiotap_pcap() {
        let mut ssids = tempfile::NamedTempFile::new().unwrap();
        writeln!(ssids, "# known open networks\nCoffeeNet\nFreeWiFi\nAirportWiFi").unwrap();
        ssids.flush().unwrap();
        let config = config_with_ssids(&ssids);

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("beacons.pcap");
        cmd_dump(config.clone(), output.clone()).unwrap();

        let (expected, _, _) = generate(&config);
        assert_eq!(expected.len(), 3);

        let mut reader = PcapReader::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(reader.header().datalink, DataLink::IEEE802_11_RADIOTAP);

        let mut packets = Vec::new();
        while let Some(packet) = reader.next_packet() {
            let packet = packet.unwrap();
            assert_eq!(packet.orig_len as usize, packet.data.len());
            packets.push(packet.data.into_owned());
        }
        assert_eq!(packets, expected);
    }

    #[test]
    fn test_dump_with_feature_disabled_writes_no_packets() {
        let mut ssids = tempfile::NamedTempFile::new().unwrap();
        writeln!(ssids, "CoffeeNet").unwrap();
        ssids.flush().unwrap();
        let mut config = config_with_ssids(&ssids);
        config.known_beacons.enabled = false;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty.pcap");
        cmd_dump(config, output.clone()).unwrap();

        let mut reader = PcapReader::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(reader.header().datalink, DataLink::IEEE802_11_RADIOTAP);
        assert!(reader.next_packet().is_none());
    }
}
