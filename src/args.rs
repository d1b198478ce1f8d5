use osmrelgeom::Endianness;

use clap::{Parser, Subcommand};

use std::path::PathBuf;

/// Reconstruction of OSM relation way geometries from a relation index
#[derive(Debug, Parser)]
#[command(about, version, author)]
pub struct Args {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Byte order of the relation index: native, little or big
    #[arg(long, default_value = "native", global = true)]
    pub endian: Endianness,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconstructs the way members of relations read from a JSON lines file
    Reconstruct {
        /// Relation index file
        index: PathBuf,

        /// Relations sorted by id, one JSON object per line
        relations: PathBuf,

        /// Output file for the reconstructed ways as JSON lines
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of relations read at once
        #[arg(long, default_value_t = 1024)]
        chunk_size: usize,
    },
    /// Checks the structure of a relation index
    Check {
        /// Relation index file
        index: PathBuf,
    },
    /// Decodes coordinate codes
    Decode {
        #[arg(required = true, allow_negative_numbers = true)]
        codes: Vec<i64>,
    },
}
