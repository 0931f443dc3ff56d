//! GoTools `.g2` geometry files.
//!
//! A file is a sequence of patch records. Each record is a class header
//! (`100` curve, `200` surface, `700` volume, followed by `1 0 0`), a
//! `dimension rational` line, one `count order` line and one knot line per
//! parametric direction, and then one coefficient line per control point with
//! the first direction running fastest.

use std::io::Write;

use patchgen_core::{ControlNet, KnotBasis, PatchgenError, Result};

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

fn class_code(pardim: usize) -> Result<u32> {
    match pardim {
        1 => Ok(100),
        2 => Ok(200),
        3 => Ok(700),
        d => Err(PatchgenError::Geometry(format!(
            "no g2 class for parametric dimension {d}"
        ))),
    }
}

fn write_values<W: Write>(out: &mut W, values: &[f64]) -> Result<()> {
    let mut first = true;
    for v in values {
        if !first {
            out.write_all(b" ")?;
        }
        write!(out, "{v}")?;
        first = false;
    }
    out.write_all(b"\n")?;
    Ok(())
}

/// Write a single patch record.
pub fn write_net<W: Write>(out: &mut W, net: &ControlNet) -> Result<()> {
    if !net.is_consistent() {
        return Err(PatchgenError::Geometry(
            "refusing to write an inconsistent control net".into(),
        ));
    }
    writeln!(out, "{} 1 0 0", class_code(net.pardim())?)?;
    writeln!(out, "{} {}", net.dimension, u8::from(net.rational))?;
    for basis in &net.bases {
        writeln!(out, "{} {}", basis.num_functions(), basis.order)?;
        write_values(out, &basis.knots)?;
    }
    for c in &net.coefficients {
        write_values(out, c)?;
    }
    Ok(())
}

/// Write all patches in order.
pub fn write_g2<W: Write>(out: &mut W, nets: &[ControlNet]) -> Result<()> {
    for net in nets {
        write_net(out, net)?;
    }
    Ok(())
}

pub fn to_g2_string(nets: &[ControlNet]) -> Result<String> {
    let mut buf = Vec::new();
    write_g2(&mut buf, nets)?;
    String::from_utf8(buf).map_err(|e| PatchgenError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

struct Reader<'a> {
    tokens: std::iter::Peekable<std::str::SplitWhitespace<'a>>,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_whitespace().peekable(),
        }
    }

    fn at_end(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    fn token(&mut self, what: &str) -> Result<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| PatchgenError::Parse(format!("unexpected end of file, expected {what}")))
    }

    fn usize(&mut self, what: &str) -> Result<usize> {
        let tok = self.token(what)?;
        tok.parse()
            .map_err(|_| PatchgenError::Parse(format!("expected {what}, found '{tok}'")))
    }

    fn f64(&mut self, what: &str) -> Result<f64> {
        let tok = self.token(what)?;
        tok.parse()
            .map_err(|_| PatchgenError::Parse(format!("expected {what}, found '{tok}'")))
    }

    fn net(&mut self) -> Result<ControlNet> {
        let pardim = match self.usize("class code")? {
            100 => 1,
            200 => 2,
            700 => 3,
            other => {
                return Err(PatchgenError::Parse(format!("unsupported g2 class {other}")));
            }
        };
        for _ in 0..3 {
            self.usize("version")?;
        }
        let dimension = self.usize("dimension")?;
        let rational = match self.usize("rational flag")? {
            0 => false,
            1 => true,
            other => {
                return Err(PatchgenError::Parse(format!("rational flag {other} is not 0 or 1")));
            }
        };

        let mut bases = Vec::with_capacity(pardim);
        for _ in 0..pardim {
            let count = self.usize("control point count")?;
            let order = self.usize("order")?;
            let knots = (0..count + order)
                .map(|_| self.f64("knot"))
                .collect::<Result<Vec<_>>>()?;
            bases.push(KnotBasis::new(order, knots));
        }

        let width = dimension + usize::from(rational);
        let total: usize = bases.iter().map(KnotBasis::num_functions).product();
        let coefficients = (0..total)
            .map(|_| (0..width).map(|_| self.f64("coefficient")).collect())
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let net = ControlNet {
            dimension,
            rational,
            bases,
            coefficients,
        };
        if !net.is_consistent() {
            return Err(PatchgenError::Parse("inconsistent patch record".into()));
        }
        Ok(net)
    }
}

/// Parse every patch record in `input`.
pub fn read_g2(input: &str) -> Result<Vec<ControlNet>> {
    let mut reader = Reader::new(input);
    let mut nets = Vec::new();
    while !reader.at_end() {
        nets.push(reader.net()?);
    }
    Ok(nets)
}
