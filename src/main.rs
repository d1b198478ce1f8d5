mod args;

use crate::args::{Args, Command};

use osmrelgeom::check::check_index;
use osmrelgeom::coord;
use osmrelgeom::jsonl::JsonRelationSource;
use osmrelgeom::{
    Endianness, IndexCursor, InputIterator, MiddleQuery, RelationIndexMiddle, Stats, WayBuffer,
};

use clap::Parser;
use colored::*;
use log::info;
use pbr::ProgressBar;
use serde::Serialize;

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

type Error = Box<dyn std::error::Error>;

/// Reconstructed way as written to the output.
#[derive(Serialize)]
struct WayRecord<'a> {
    relation: i64,
    id: i64,
    role: &'a str,
    nodes: Vec<(i64, Option<f64>, Option<f64>)>,
}

fn write_ways<W: Write>(
    writer: &mut W,
    relation_id: i64,
    buffer: &WayBuffer,
    roles: &[String],
) -> Result<(), Error> {
    for (way, role) in buffer.iter().zip(roles) {
        let record = WayRecord {
            relation: relation_id,
            id: way.id,
            role,
            nodes: way
                .nodes
                .iter()
                .map(|n| {
                    (
                        n.id,
                        n.location.map(|l| l.lon),
                        n.location.map(|l| l.lat),
                    )
                })
                .collect(),
        };
        serde_json::to_writer(&mut *writer, &record)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

fn reconstruct(
    index: &Path,
    relations: &Path,
    output: Option<&Path>,
    chunk_size: usize,
    endianness: Endianness,
) -> Result<Stats, Error> {
    let middle = RelationIndexMiddle::new(IndexCursor::open(index, endianness)?);
    let query = middle.query();

    let source = Rc::new(RefCell::new(JsonRelationSource::new(
        BufReader::new(File::open(relations)?),
        chunk_size,
    )));
    let mut writer = match output {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    info!("Reconstructing relations from {}...", relations.display());
    let mut buffer = WayBuffer::new();
    let mut roles = Vec::new();
    InputIterator::new(source.clone()).try_for_each_ref(|relation| -> Result<(), Error> {
        buffer.clear();
        roles.clear();
        query.rel_way_members_get(relation, Some(&mut roles), &mut buffer)?;
        if let Some(writer) = writer.as_mut() {
            write_ways(writer, relation.id, &buffer, &roles)?;
        }
        Ok(())
    })?;
    if let Some(e) = source.borrow_mut().take_error() {
        return Err(e.into());
    }
    if let Some(mut writer) = writer {
        writer.flush()?;
    }
    info!("Relations reconstructed.");

    Ok(middle.stats())
}

fn check(index: &Path, endianness: Endianness) -> Result<Stats, Error> {
    let mut cursor = IndexCursor::open(index, endianness)?;
    let len = cursor.len();
    let step = (len / 1000).max(1);
    let mut pb = ProgressBar::new(len as u64);
    pb.message("Checking relation index...");
    let mut last = 0;
    let stats = check_index(&mut cursor, |position| {
        if position - last >= step {
            pb.set(position as u64);
            last = position;
        }
    })?;
    pb.finish();
    Ok(stats)
}

fn decode(codes: &[i64]) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for &code in codes {
        match coord::decode(code) {
            Some(location) => writeln!(out, "{}: {:.7} {:.7}", code, location.lon, location.lat)?,
            None => writeln!(out, "{}: none", code)?,
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<(), Error> {
    match args.command {
        Command::Reconstruct {
            index,
            relations,
            output,
            chunk_size,
        } => {
            let stats = reconstruct(
                &index,
                &relations,
                output.as_deref(),
                chunk_size,
                args.endian,
            )?;
            println!("{}", stats);
        }
        Command::Check { index } => {
            let stats = check(&index, args.endian)?;
            println!("{}", stats);
        }
        Command::Decode { codes } => decode(&codes)?,
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_module_path(false)
        .format_timestamp_nanos()
        .init();

    if let Err(e) = run(args) {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(1);
    }
}
