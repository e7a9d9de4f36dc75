//! Parser for the ASCII AIGER (`.aag`) format.
//!
//! Only the combinational subset is supported: latches are rejected. Symbol
//! lines (`i<ord> name` / `o<ord> name`) and a trailing comment section are
//! accepted. Linking creates [`GateKind::Undef`] placeholders for any
//! referenced-but-undefined id.

use std::{fs, path::Path};

use crate::{Aig, AigEdge, GateKind, NodeId, Result, aig::error::ParserError};

fn read_u64(s: &str) -> std::result::Result<u64, ParserError> {
    s.parse::<u64>()
        .map_err(|_| ParserError::InvalidToken(s.to_string() + " expected u64"))
}

fn check_even(x: u64) -> Result<()> {
    if x & 1 == 1 {
        return Err(ParserError::InvalidToken(
            "expected literal to be even, got ".to_string() + &x.to_string(),
        )
        .into());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    m: u64,
    i: u64,
    o: u64,
    a: u64,
}

impl TryFrom<&str> for Header {
    type Error = ParserError;

    fn try_from(line: &str) -> std::result::Result<Self, Self::Error> {
        let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

        if tokens.len() < 6 {
            return Err(ParserError::InvalidToken(
                "missing header tokens".to_string(),
            ));
        }

        if tokens[0] != "aag" {
            return Err(ParserError::InvalidToken("expected aag".to_string()));
        }

        let m = read_u64(tokens[1])?;
        let i = read_u64(tokens[2])?;
        let l = read_u64(tokens[3])?;
        let o = read_u64(tokens[4])?;
        let a = read_u64(tokens[5])?;

        if tokens.len() > 6 {
            return Err(ParserError::UnsupportedFeature(
                "header only supports M I L O A".to_string(),
            ));
        }

        if l != 0 {
            return Err(ParserError::UnsupportedFeature(
                "latches are not supported".to_string(),
            ));
        }

        if m < i + a {
            return Err(ParserError::InvalidToken(format!(
                "header bound M = {} smaller than I + A = {}",
                m,
                i + a
            )));
        }

        Ok(Header { m, i, o, a })
    }
}

fn read_literal(line: &str, max: u64) -> Result<AigEdge> {
    let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

    if tokens.is_empty() {
        return Err(
            ParserError::InvalidToken("expected literal token, got nothing".to_string()).into(),
        );
    }

    if tokens.len() > 1 {
        return Err(ParserError::InvalidToken(
            "expected nothing after literal, got ".to_string() + tokens[1],
        )
        .into());
    }

    let lit = read_u64(tokens[0])?;
    if lit >> 1 > max {
        return Err(ParserError::InvalidToken(format!(
            "literal {} exceeds the header bound M = {}",
            lit, max
        ))
        .into());
    }
    Ok(AigEdge::from_literal(lit))
}

fn read_and(line: &str, max: u64) -> Result<(NodeId, AigEdge, AigEdge)> {
    let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

    if tokens.len() < 3 {
        return Err(ParserError::InvalidToken("not enough and tokens".to_string()).into());
    }

    if tokens.len() > 3 {
        return Err(ParserError::InvalidToken(
            "expected nothing after and tokens, got ".to_string() + tokens[3],
        )
        .into());
    }

    let id = read_u64(tokens[0])?;
    let lit0 = read_u64(tokens[1])?;
    let lit1 = read_u64(tokens[2])?;
    check_even(id)?;
    for lit in [id, lit0, lit1] {
        if lit >> 1 > max {
            return Err(ParserError::InvalidToken(format!(
                "literal {} exceeds the header bound M = {}",
                lit, max
            ))
            .into());
        }
    }
    Ok((
        id >> 1,
        AigEdge::from_literal(lit0),
        AigEdge::from_literal(lit1),
    ))
}

/// Symbol line: `i<ord> name` or `o<ord> name`.
fn read_symbol(line: &str) -> Result<(bool, usize, String)> {
    let (is_input, rest) = if let Some(rest) = line.strip_prefix('i') {
        (true, rest)
    } else if let Some(rest) = line.strip_prefix('o') {
        (false, rest)
    } else {
        return Err(ParserError::InvalidToken(
            "expected symbol line, got ".to_string() + line,
        )
        .into());
    };
    let (ord_str, name) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| ParserError::InvalidToken("symbol line without a name".to_string()))?;
    let ord = read_u64(ord_str)? as usize;
    Ok((is_input, ord, name.trim_end().to_string()))
}

fn build_aig(
    header: Header,
    inputs: Vec<AigEdge>,
    outputs: Vec<AigEdge>,
    ands: Vec<(NodeId, AigEdge, AigEdge)>,
) -> Result<Aig> {
    let mut aig = Aig::new(header.m, outputs.len())?;

    for input in &inputs {
        if input.complement {
            return Err(ParserError::InvalidToken(format!(
                "input literal {} is inverted",
                input.literal()
            ))
            .into());
        }
        if input.id == 0 {
            return Err(ParserError::InvalidToken(
                "literal 0 declared as an input".to_string(),
            )
            .into());
        }
        aig.add_node(input.id, GateKind::Input)?;
    }

    for &(id, _, _) in &ands {
        if id == 0 {
            return Err(ParserError::InvalidToken(
                "literal 0 redefined as an and gate".to_string(),
            )
            .into());
        }
        aig.add_node(id, GateKind::And)?;
    }

    // PO gates sit above the declared variable range.
    for (ordinal, _) in outputs.iter().enumerate() {
        aig.add_node(header.m + 1 + ordinal as u64, GateKind::Output)?;
    }

    // Linking. Referenced-but-undefined ids become placeholders.
    fn link(aig: &mut Aig, gate: NodeId, slot: usize, edge: AigEdge) -> Result<()> {
        if aig.get_node(edge.id).is_none() {
            aig.add_node(edge.id, GateKind::Undef)?;
        }
        aig.link(gate, slot, edge)
    }
    for &(id, fanin0, fanin1) in &ands {
        link(&mut aig, id, 0, fanin0)?;
        link(&mut aig, id, 1, fanin1)?;
    }
    for (ordinal, &edge) in outputs.iter().enumerate() {
        link(&mut aig, header.m + 1 + ordinal as u64, 0, edge)?;
    }

    aig.refresh_lists()?;
    aig.check_integrity()?;
    Ok(aig)
}

pub(crate) fn parse_aag(src: &str) -> Result<Aig> {
    let mut lines = src.lines();

    let header = Header::try_from(lines.next().unwrap_or(""))?;

    let mut inputs = Vec::with_capacity(header.i as usize);
    for _ in 0..header.i {
        inputs.push(read_literal(lines.next().unwrap_or(""), header.m)?);
    }
    let mut outputs = Vec::with_capacity(header.o as usize);
    for _ in 0..header.o {
        outputs.push(read_literal(lines.next().unwrap_or(""), header.m)?);
    }
    let mut ands = Vec::with_capacity(header.a as usize);
    for _ in 0..header.a {
        ands.push(read_and(lines.next().unwrap_or(""), header.m)?);
    }

    let mut aig = build_aig(header, inputs, outputs, ands)?;

    // Symbol lines, then an optional comment section we ignore.
    for line in lines {
        if line.trim() == "c" {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let (is_input, ord, name) = read_symbol(line)?;
        let gates = if is_input {
            aig.get_inputs()
        } else {
            aig.get_outputs()
        };
        let &id = gates.get(ord).ok_or_else(|| {
            ParserError::InvalidToken(format!(
                "symbol ordinal {} out of range ({} declared)",
                ord,
                gates.len()
            ))
        })?;
        if aig.node(id)?.symbol().is_some() {
            return Err(ParserError::InvalidToken(format!(
                "gate {} already has a symbol",
                id
            ))
            .into());
        }
        aig.node_mut(id)?.set_symbol(name);
    }

    Ok(aig)
}

pub(crate) fn parse_aag_from_file(path: &Path) -> Result<Aig> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("aag") {
        return Err(ParserError::IoError("invalid extension, expected .aag".to_string()).into());
    }
    let src = fs::read_to_string(path).map_err(|z| ParserError::IoError(z.to_string()))?;
    parse_aag(&src)
}
