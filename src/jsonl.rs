use crate::error::Error;
use crate::input::ChunkSource;
use crate::osm::Relation;

use log::warn;

use std::io::BufRead;

/// Reads relations stored as one JSON object per line.
///
/// Relations are yielded in chunks of up to `chunk_size`. Reading stops at
/// the first malformed line or I/O error, which is kept and can be retrieved
/// with `take_error`.
pub struct JsonRelationSource<R> {
    reader: R,
    chunk_size: usize,
    line: usize,
    buf: String,
    error: Option<Error>,
    done: bool,
}

impl<R: BufRead> JsonRelationSource<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            line: 0,
            buf: String::new(),
            error: None,
            done: false,
        }
    }

    /// Returns the error which ended the input, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    fn fail(&mut self, e: Error) {
        warn!("Stopped reading relations at line {}: {}", self.line, e);
        self.error = Some(e);
        self.done = true;
    }

    fn read_relation(&mut self) -> Option<Relation> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => (),
                Err(e) => {
                    self.fail(e.into());
                    return None;
                }
            }
            self.line += 1;
            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(relation) => return Some(relation),
                Err(source) => {
                    let line = self.line;
                    self.fail(Error::InvalidRelation { line, source });
                    return None;
                }
            }
        }
    }
}

impl<R: BufRead> ChunkSource for JsonRelationSource<R> {
    type Item = Relation;

    fn read(&mut self) -> Option<Vec<Relation>> {
        if self.done {
            return None;
        }
        let mut chunk = Vec::with_capacity(self.chunk_size);
        while chunk.len() < self.chunk_size {
            match self.read_relation() {
                Some(relation) => chunk.push(relation),
                None => break,
            }
        }
        if chunk.is_empty() && self.done {
            None
        } else {
            Some(chunk)
        }
    }
}
