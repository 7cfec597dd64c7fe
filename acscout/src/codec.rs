/// Persistence of compiled automata.
///
/// # Container format (version 1)
///
/// A single gzip member. Every integer in the decompressed payload is an unsigned
/// 64-bit little-endian value. The payload is a header of four element counts followed
/// by the arrays in the same order:
///
/// ```text
/// u64  n_dict                    element count of dict_len
/// u64  n_trans                   row count of the transition table
/// u64  n_link                    element count of dict_link
/// u64  n_pat                     element count of pattern
/// u64  dict_len[n_dict]
/// u64  trans[n_trans][256]       row-major, state ids
/// u64  dict_link[n_link]         state ids, 0 = none
/// u64  pattern[n_pat]
/// ```
///
/// All four counts equal the state count, which includes the sentinel (id 0) and the
/// root (id 1). Only the flattened table is stored; sparse trie edges and failure links
/// are not needed to reproduce matching.
///
/// Decoding either returns a fully validated [`Automaton`] or an error; nothing partial
/// is ever handed back.
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::automaton::{Automaton, StateId, ALPHABET, NIL_STATE, ROOT_STATE};
use crate::errors::{AcError, AcResult};

/// Number of u64 counts in the header
pub const HEADER_FIELDS: usize = 4;

/// Upper bound on elements reserved ahead of reading, so a corrupt header cannot force
/// a huge allocation before the stream runs dry
const MAX_PREALLOC: usize = 1 << 20;

/// Writes `automaton` to `writer` as a gzip-compressed container
pub fn encode<W: Write>(writer: W, automaton: &Automaton) -> AcResult<()> {
    let mut w = BufWriter::new(GzEncoder::new(writer, Compression::default()));

    let states = automaton.state_count() as u64;
    for count in [states; HEADER_FIELDS] {
        write_u64(&mut w, count)?;
    }

    write_all(&mut w, automaton.dict_lengths())?;
    write_all(&mut w, automaton.transitions())?;
    write_all(&mut w, automaton.dict_links())?;
    write_all(&mut w, automaton.pattern_indices())?;

    let encoder = w.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?.flush()?;

    debug!("Encoded automaton with {} states", states);
    Ok(())
}

/// Reads a container produced by [`encode`]
pub fn decode<R: Read>(reader: R) -> AcResult<Automaton> {
    let mut r = BufReader::new(GzDecoder::new(reader));

    let mut header = [0usize; HEADER_FIELDS];
    for (i, field) in header.iter_mut().enumerate() {
        *field = read_count(&mut r, HEADER_NAMES[i])?;
    }
    let [n_dict, n_trans, n_link, n_pat] = header;
    if n_trans != n_dict || n_link != n_dict || n_pat != n_dict {
        return Err(AcError::decode(format!(
            "header counts disagree: dict_len={n_dict}, trans={n_trans}, \
             dict_link={n_link}, pattern={n_pat}"
        )));
    }
    let states = n_dict;
    if states <= ROOT_STATE {
        return Err(AcError::decode(format!(
            "state count {states} is missing the root"
        )));
    }
    let cells = states
        .checked_mul(ALPHABET)
        .ok_or_else(|| AcError::decode(format!("state count {states} is too large")))?;

    let dict_len = read_array(&mut r, states, "dict_len")?;
    let trans = read_array(&mut r, cells, "transition table")?;
    let dict_link = read_array(&mut r, states, "dict_link")?;
    let pattern = read_array(&mut r, states, "pattern")?;

    let mut tail = [0u8; 1];
    if read_or_decode_error(r.read(&mut tail), "trailing data")? != 0 {
        return Err(AcError::decode("unexpected data after the last array"));
    }

    validate(&trans, &dict_len, &dict_link)?;

    debug!("Decoded automaton with {} states", states);
    Ok(Automaton::from_parts(trans, dict_len, pattern, dict_link))
}

impl Automaton {
    /// Writes this automaton to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> AcResult<()> {
        let file = File::create(path).map_err(|e| AcError::from_io(path, e))?;
        encode(file, self)?;
        info!("Saved automaton to {}", path.display());
        Ok(())
    }

    /// Reads an automaton previously written with [`Automaton::save`]
    pub fn load(path: &Path) -> AcResult<Self> {
        let file = File::open(path).map_err(|e| AcError::from_io(path, e))?;
        let automaton = decode(file)?;
        info!(
            "Loaded automaton from {} ({} states)",
            path.display(),
            automaton.state_count()
        );
        Ok(automaton)
    }
}

const HEADER_NAMES: [&str; HEADER_FIELDS] = [
    "dict_len count",
    "transition row count",
    "dict_link count",
    "pattern count",
];

fn write_u64<W: Write>(w: &mut W, value: u64) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

fn write_all<W: Write>(w: &mut W, values: &[usize]) -> io::Result<()> {
    for &value in values {
        write_u64(w, value as u64)?;
    }
    Ok(())
}

/// Stream corruption surfaces from flate2 as I/O errors; report those as decode errors.
fn read_or_decode_error<T>(result: io::Result<T>, what: &str) -> AcResult<T> {
    result.map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            AcError::decode(format!("unexpected end of stream while reading {what}"))
        }
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
            AcError::decode(format!("corrupt stream while reading {what}: {e}"))
        }
        _ => AcError::IoError(e),
    })
}

fn read_count<R: Read>(r: &mut R, what: &str) -> AcResult<usize> {
    let mut bytes = [0u8; 8];
    read_or_decode_error(r.read_exact(&mut bytes), what)?;
    let value = u64::from_le_bytes(bytes);
    usize::try_from(value)
        .map_err(|_| AcError::decode(format!("{what} {value} does not fit in memory")))
}

fn read_array<R: Read>(r: &mut R, len: usize, what: &str) -> AcResult<Vec<usize>> {
    let mut values = Vec::with_capacity(len.min(MAX_PREALLOC));
    for _ in 0..len {
        values.push(read_count(r, what)?);
    }
    Ok(values)
}

/// Checks the invariants matching relies on, so a corrupt container is rejected here
/// instead of panicking or looping during a scan.
fn validate(trans: &[StateId], dict_len: &[usize], dict_link: &[StateId]) -> AcResult<()> {
    let states = dict_len.len();

    if let Some(pos) = trans.iter().position(|&t| t == NIL_STATE || t >= states) {
        return Err(AcError::decode(format!(
            "transition from state {} on byte {} targets invalid state {}",
            pos / ALPHABET,
            pos % ALPHABET,
            trans[pos]
        )));
    }

    for reserved in [NIL_STATE, ROOT_STATE] {
        if dict_len[reserved] != 0 || dict_link[reserved] != NIL_STATE {
            return Err(AcError::decode(format!(
                "reserved state {reserved} must not accept or link"
            )));
        }
    }

    for (s, &link) in dict_link.iter().enumerate() {
        if link == NIL_STATE {
            continue;
        }
        if link >= states || dict_len[link] == 0 {
            return Err(AcError::decode(format!(
                "dictionary link of state {s} targets non-accepting state {link}"
            )));
        }
        // Links must shorten, which keeps every chain finite
        if dict_len[s] != 0 && dict_len[link] >= dict_len[s] {
            return Err(AcError::decode(format!(
                "dictionary link of state {s} does not shorten the match"
            )));
        }
    }

    // A match reported at a state can be no longer than the input consumed to reach it.
    // Chains shorten, so checking each state and its first link covers the whole chain.
    let depth = shortest_depths(trans, states);
    for s in 0..states {
        let Some(d) = depth[s] else { continue };
        let link = dict_link[s];
        let longest = dict_len[s].max(if link == NIL_STATE { 0 } else { dict_len[link] });
        if longest > d {
            return Err(AcError::decode(format!(
                "state {s} reports a {longest}-byte match but is reachable after {d} bytes"
            )));
        }
    }

    Ok(())
}

/// Breadth-first distance from the root to every state, `None` where unreachable
fn shortest_depths(trans: &[StateId], states: usize) -> Vec<Option<usize>> {
    let mut depth = vec![None; states];
    depth[ROOT_STATE] = Some(0);
    let mut queue = VecDeque::from([ROOT_STATE]);

    while let Some(s) = queue.pop_front() {
        let next_depth = depth[s].map_or(0, |d| d + 1);
        for &t in &trans[s * ALPHABET..(s + 1) * ALPHABET] {
            if depth[t].is_none() {
                depth[t] = Some(next_depth);
                queue.push_back(t);
            }
        }
    }

    depth
}
