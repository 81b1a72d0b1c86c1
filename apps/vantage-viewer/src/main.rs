use anyhow::Result;
use clap::{Parser, Subcommand};
use glam::{Quat, Vec3};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vantage_client::{Session, SessionConfig};
use vantage_common::{EntityId, ModelIndex};
use vantage_render::TextScene;
use vantage_wire::encode::{Instruction, encode_update_message};
use vantage_wire::{ByteOrder, DecodeConfig, DecodedBody, Opcode, decode};

#[derive(Parser)]
#[command(name = "vantage-viewer", about = "Offline viewer for vantage entity streams")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Decode multi-byte scalars as little-endian
    #[arg(long)]
    little_endian: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one captured message and print it
    Decode {
        /// File containing exactly one complete message
        file: PathBuf,
        /// Print the decoded message as JSON
        #[arg(long)]
        json: bool,
    },
    /// Synthesize a deterministic stream and run it through the full pipeline
    Replay {
        /// Number of entities in the synthesized scene
        #[arg(short, long, default_value = "4")]
        entities: u32,
        /// Number of update messages to feed through the session
        #[arg(short, long, default_value = "10")]
        ticks: u32,
    },
    /// Print the wire opcode table and version
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let order = if cli.little_endian {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    };

    match cli.command {
        Commands::Decode { file, json } => decode_file(&file, order, json),
        Commands::Replay { entities, ticks } => replay(entities, ticks, order),
        Commands::Info => {
            print_info();
            Ok(())
        }
    }
}

fn decode_file(path: &Path, order: ByteOrder, json: bool) -> Result<()> {
    let buf = std::fs::read(path)?;
    let config = DecodeConfig {
        order,
        ..Default::default()
    };
    let (envelope, body) = decode(&buf, config)?;

    if json {
        let value = serde_json::json!({
            "envelope": envelope,
            "body": body,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("timestamp   : {}", envelope.timestamp);
    println!("server tick : {}", envelope.server_tick);
    match body {
        DecodedBody::EntityUpdates(batch) => {
            println!("entity updates: {}", batch.len());
            for (id, update) in &batch {
                println!("  [{id}]");
                if let Some(p) = update.position {
                    println!("    position    ({}, {}, {})", p.x, p.y, p.z);
                }
                if let Some(q) = update.orientation {
                    println!("    orientation ({}, {}, {}, {})", q.w, q.x, q.y, q.z);
                }
                if let Some(m) = update.model {
                    println!("    model       {}", m.0);
                }
                if let Some(s) = update.scale {
                    println!("    scale       ({}, {}, {})", s.x, s.y, s.z);
                }
                if let Some(h) = update.health {
                    println!("    health      {h}");
                }
            }
        }
        DecodedBody::EntityInfo(info) => {
            println!("entity info : code={} id={} {}", info.code, info.id, info.text);
        }
    }
    Ok(())
}

/// Feed a bounded, parametric stream through a session into the text scene.
/// Entities orbit the origin and lose health as ticks pass, so every opcode
/// and the tier classification get exercised.
fn replay(entities: u32, ticks: u32, order: ByteOrder) -> Result<()> {
    let config = SessionConfig {
        decode: DecodeConfig {
            order,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut session = Session::new(config);
    let mut scene = TextScene::new();

    let entities = entities.max(1);
    let ticks = ticks.max(1);

    for tick in 0..ticks {
        let mut instructions = Vec::new();
        for id in 1..=entities {
            let phase = tick as f32 * 0.2 + id as f32;
            instructions.push(Instruction::SelectEntity(EntityId(id)));
            instructions.push(Instruction::SetPosition(Vec3::new(
                phase.cos() * 10.0,
                0.0,
                phase.sin() * 10.0,
            )));
            instructions.push(Instruction::SetRotation(Quat::from_rotation_y(phase)));
            if tick == 0 {
                instructions.push(Instruction::SetModel(ModelIndex(id % 2)));
                instructions.push(Instruction::SetScale(Vec3::splat(1.0 + (id % 3) as f32)));
            }
            let wear = (tick as f32 / ticks as f32) * (id as f32 / entities as f32);
            instructions.push(Instruction::SetHealth(1.0 - wear));
        }

        let buf = encode_update_message(tick as f64 * 0.1, tick as f32, &instructions, order);
        if let Err(err) = session.handle(&buf, &mut scene) {
            tracing::error!(%err, tick, "message dropped");
        }
    }

    print!("{}", scene.render());
    let stats = session.stats();
    println!(
        "messages={} applied={} failed={} entities={}",
        stats.received,
        stats.applied,
        stats.failed,
        session.table().len()
    );
    Ok(())
}

fn print_info() {
    println!("vantage-viewer v{}", env!("CARGO_PKG_VERSION"));
    println!("opcode table:");
    for opcode in [
        Opcode::SelectEntity,
        Opcode::SetPosition,
        Opcode::SetRotation,
        Opcode::SetModel,
        Opcode::SetScale,
        Opcode::SetHealth,
    ] {
        println!(
            "  {:>2}  {:?} ({} floats)",
            opcode.to_wire(),
            opcode,
            opcode.arity()
        );
    }
}
