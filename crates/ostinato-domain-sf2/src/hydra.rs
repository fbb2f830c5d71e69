//! Decoder for the pdta ("hydra") record tables and the INFO chunk.
//!
//! Every pdta sub-chunk is a flat array of fixed-stride records ending in a
//! terminal sentinel. Zone boundaries come from consecutive bag indices, so
//! the sentinel records are consumed as range terminators and never emitted
//! as values.

use crate::error::FormatError;
use crate::model::{
    Bank, BankInfo, Generator, GeneratorType, Instrument, Modulator, Preset, SampleHeader, Version,
    Zone,
};
use crate::riff::{Container, FourCc, RawChunk};
use std::ops::Range;
use std::sync::Arc;

const IFIL: FourCc = FourCc(*b"ifil");
const INAM: FourCc = FourCc(*b"INAM");
const SMPL: FourCc = FourCc(*b"smpl");
const PHDR: FourCc = FourCc(*b"phdr");
const PBAG: FourCc = FourCc(*b"pbag");
const PGEN: FourCc = FourCc(*b"pgen");
const PMOD: FourCc = FourCc(*b"pmod");
const INST: FourCc = FourCc(*b"inst");
const IBAG: FourCc = FourCc(*b"ibag");
const IGEN: FourCc = FourCc(*b"igen");
const IMOD: FourCc = FourCc(*b"imod");
const SHDR: FourCc = FourCc(*b"shdr");

const PHDR_STRIDE: usize = 38;
const BAG_STRIDE: usize = 4;
const GEN_STRIDE: usize = 4;
const MOD_STRIDE: usize = 10;
const INST_STRIDE: usize = 22;
const SHDR_STRIDE: usize = 46;

/// Flat fixed-stride record array backed by one chunk body.
struct Records<'a> {
    table: &'static str,
    data: &'a [u8],
    stride: usize,
}

impl<'a> Records<'a> {
    fn read(
        data: &'a [u8],
        chunk: &RawChunk,
        stride: usize,
        table: &'static str,
    ) -> Result<Self, FormatError> {
        let body = chunk.range.slice(data);
        if body.len() % stride != 0 {
            return Err(FormatError::MisalignedRecords {
                id: chunk.id,
                len: body.len(),
                stride,
            });
        }
        Ok(Self {
            table,
            data: body,
            stride,
        })
    }

    fn count(&self) -> usize {
        self.data.len() / self.stride
    }

    fn get(&self, index: usize) -> Result<&'a [u8], FormatError> {
        if index >= self.count() {
            return Err(FormatError::BadTableIndex {
                table: self.table,
                index,
                len: self.count(),
            });
        }
        Ok(&self.data[index * self.stride..(index + 1) * self.stride])
    }
}

fn u16_at(record: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([record[offset], record[offset + 1]])
}

fn u32_at(record: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        record[offset],
        record[offset + 1],
        record[offset + 2],
        record[offset + 3],
    ])
}

/// Fixed 20-byte name field, NUL-padded.
fn name_at(record: &[u8]) -> String {
    let field = &record[..20];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).trim_end().to_string()
}

fn zero_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

fn decode_info(data: &[u8], container: &Container) -> BankInfo {
    let version = container
        .info_chunk(IFIL)
        .map(|c| c.range.slice(data))
        .filter(|body| body.len() >= 4)
        .map(|body| Version {
            major: u16_at(body, 0),
            minor: u16_at(body, 2),
        })
        .unwrap_or_default();
    let name = container
        .info_chunk(INAM)
        .map(|c| zero_terminated(c.range.slice(data)))
        .unwrap_or_default();
    BankInfo { name, version }
}

/// (generator index, modulator index) per bag record, terminal included.
fn read_bags(bags: &Records) -> Result<Vec<(usize, usize)>, FormatError> {
    let mut out = Vec::with_capacity(bags.count());
    for i in 0..bags.count() {
        let record = bags.get(i)?;
        out.push((u16_at(record, 0) as usize, u16_at(record, 2) as usize));
    }
    Ok(out)
}

/// Builds the zones for one instrument or preset from its bag range.
/// An empty generator list is a valid global zone and is kept.
fn build_zones(
    bag_range: Range<usize>,
    bag_table: &'static str,
    bags: &[(usize, usize)],
    gens: &Records,
    mods: &Records,
) -> Result<Vec<Zone>, FormatError> {
    let mut zones = Vec::with_capacity(bag_range.len());
    for z in bag_range {
        let bag_at = |index: usize| {
            bags.get(index).copied().ok_or(FormatError::BadTableIndex {
                table: bag_table,
                index,
                len: bags.len(),
            })
        };
        let (gen_start, mod_start) = bag_at(z)?;
        let (gen_end, mod_end) = bag_at(z + 1)?;
        if gen_end < gen_start || mod_end < mod_start {
            return Err(FormatError::BadTableIndex {
                table: bag_table,
                index: z + 1,
                len: bags.len(),
            });
        }

        let mut generators = Vec::with_capacity(gen_end - gen_start);
        for g in gen_start..gen_end {
            let record = gens.get(g)?;
            generators.push(Generator::new(
                GeneratorType::from_raw(u16_at(record, 0)),
                u16_at(record, 2),
            ));
        }

        let mut modulators = Vec::with_capacity(mod_end - mod_start);
        for m in mod_start..mod_end {
            let record = mods.get(m)?;
            modulators.push(Modulator {
                src_oper: u16_at(record, 0),
                dest_oper: u16_at(record, 2),
                amount: u16_at(record, 4) as i16,
                amount_src_oper: u16_at(record, 6),
                trans_oper: u16_at(record, 8),
            });
        }

        zones.push(Zone {
            generators,
            modulators,
        });
    }
    Ok(zones)
}

fn decode_instruments(data: &[u8], container: &Container) -> Result<Vec<Instrument>, FormatError> {
    let inst = Records::read(data, container.pdta_chunk(INST)?, INST_STRIDE, "inst")?;
    if inst.count() < 1 {
        return Err(FormatError::MissingTerminator { id: INST });
    }
    let bags = read_bags(&Records::read(
        data,
        container.pdta_chunk(IBAG)?,
        BAG_STRIDE,
        "ibag",
    )?)?;
    let gens = Records::read(data, container.pdta_chunk(IGEN)?, GEN_STRIDE, "igen")?;
    let mods = Records::read(data, container.pdta_chunk(IMOD)?, MOD_STRIDE, "imod")?;

    let mut headers = Vec::with_capacity(inst.count());
    for i in 0..inst.count() {
        let record = inst.get(i)?;
        headers.push((name_at(record), u16_at(record, 20) as usize));
    }

    let mut instruments = Vec::with_capacity(inst.count() - 1);
    for pair in headers.windows(2) {
        let (ref name, bag_start) = pair[0];
        let (_, bag_end) = pair[1];
        if bag_end < bag_start {
            return Err(FormatError::BadTableIndex {
                table: "ibag",
                index: bag_end,
                len: bags.len(),
            });
        }
        let zones = build_zones(bag_start..bag_end, "ibag", &bags, &gens, &mods)?;
        instruments.push(Instrument {
            name: name.clone(),
            zones,
        });
    }
    Ok(instruments)
}

fn decode_presets(data: &[u8], container: &Container) -> Result<Vec<Preset>, FormatError> {
    let phdr = Records::read(data, container.pdta_chunk(PHDR)?, PHDR_STRIDE, "phdr")?;
    if phdr.count() < 1 {
        return Err(FormatError::MissingTerminator { id: PHDR });
    }
    let bags = read_bags(&Records::read(
        data,
        container.pdta_chunk(PBAG)?,
        BAG_STRIDE,
        "pbag",
    )?)?;
    let gens = Records::read(data, container.pdta_chunk(PGEN)?, GEN_STRIDE, "pgen")?;
    let mods = Records::read(data, container.pdta_chunk(PMOD)?, MOD_STRIDE, "pmod")?;

    struct PresetHeader {
        name: String,
        patch: u16,
        bank: u16,
        bag: usize,
    }

    let mut headers = Vec::with_capacity(phdr.count());
    for i in 0..phdr.count() {
        let record = phdr.get(i)?;
        headers.push(PresetHeader {
            name: name_at(record),
            patch: u16_at(record, 20),
            bank: u16_at(record, 22),
            bag: u16_at(record, 24) as usize,
        });
    }

    let mut presets = Vec::with_capacity(phdr.count() - 1);
    for pair in headers.windows(2) {
        let header = &pair[0];
        let bag_end = pair[1].bag;
        if bag_end < header.bag {
            return Err(FormatError::BadTableIndex {
                table: "pbag",
                index: bag_end,
                len: bags.len(),
            });
        }
        let zones = build_zones(header.bag..bag_end, "pbag", &bags, &gens, &mods)?;
        presets.push(Preset {
            name: header.name.clone(),
            patch: header.patch,
            bank: header.bank,
            zones,
        });
    }
    Ok(presets)
}

fn decode_sample_headers(
    data: &[u8],
    container: &Container,
) -> Result<Vec<SampleHeader>, FormatError> {
    let shdr = Records::read(data, container.pdta_chunk(SHDR)?, SHDR_STRIDE, "shdr")?;
    if shdr.count() < 1 {
        return Err(FormatError::MissingTerminator { id: SHDR });
    }

    let mut headers = Vec::with_capacity(shdr.count() - 1);
    for i in 0..shdr.count() - 1 {
        let record = shdr.get(i)?;
        let mut original_pitch = record[40];
        if original_pitch == 255 {
            // convention for unpitched samples
            original_pitch = 60;
        }
        headers.push(SampleHeader {
            name: name_at(record),
            start: u32_at(record, 20),
            end: u32_at(record, 24),
            loop_start: u32_at(record, 28),
            loop_end: u32_at(record, 32),
            sample_rate_hz: u32_at(record, 36),
            original_pitch,
            pitch_correction: record[41] as i8,
            sample_link: u16_at(record, 42),
            sample_type: u16_at(record, 44),
        });
    }
    Ok(headers)
}

/// Decodes a validated container into a `Bank`. Cross-table references
/// (zone -> sample, preset zone -> instrument) are checked here so lookups
/// on the finished bank cannot dangle.
pub fn decode_bank(data: &[u8], container: &Container) -> Result<Bank, FormatError> {
    let info = decode_info(data, container);
    let smpl = container
        .sdta_chunk(SMPL)
        .ok_or(FormatError::MissingChunk(SMPL))?;
    let pcm: Arc<[u8]> = Arc::from(smpl.range.slice(data));

    let sample_headers = decode_sample_headers(data, container)?;
    let instruments = decode_instruments(data, container)?;
    let presets = decode_presets(data, container)?;

    for instrument in &instruments {
        for zone in &instrument.zones {
            if let Some(id) = zone.sample_id() {
                if id as usize >= sample_headers.len() {
                    return Err(FormatError::BadTableIndex {
                        table: "shdr",
                        index: id as usize,
                        len: sample_headers.len(),
                    });
                }
            }
        }
    }
    for preset in &presets {
        for zone in &preset.zones {
            if let Some(g) = zone.generator(GeneratorType::Instrument) {
                let id = g.amount_u16() as usize;
                if id >= instruments.len() {
                    return Err(FormatError::BadTableIndex {
                        table: "inst",
                        index: id,
                        len: instruments.len(),
                    });
                }
            }
        }
    }

    Ok(Bank::new(info, presets, instruments, sample_headers, pcm))
}
