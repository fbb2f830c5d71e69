//! Synthetic .sf2 byte-stream builder for tests.
//!
//! Emits a structurally valid sfbk form: INFO with ifil/INAM, sdta with one
//! smpl chunk, and the nine pdta tables with their terminal sentinel
//! records. Tests corrupt the output afterwards (or via `append_garbage`)
//! to exercise the failure paths.

/// One zone as raw generator/modulator records.
#[derive(Clone, Debug, Default)]
pub struct ZoneSpec {
    pub generators: Vec<(u16, u16)>,
    pub modulators: Vec<[u8; 10]>,
}

/// Zone referencing sample `sample_id` (generator 53).
pub fn sample_zone(sample_id: u16) -> ZoneSpec {
    ZoneSpec {
        generators: vec![(53, sample_id)],
        modulators: Vec::new(),
    }
}

/// Zone with no generators at all (a global zone).
pub fn global_zone() -> ZoneSpec {
    ZoneSpec::default()
}

pub fn zone(generators: Vec<(u16, u16)>) -> ZoneSpec {
    ZoneSpec {
        generators,
        modulators: Vec::new(),
    }
}

pub fn raw_modulator(
    src_oper: u16,
    dest_oper: u16,
    amount: i16,
    amount_src_oper: u16,
    trans_oper: u16,
) -> [u8; 10] {
    let mut record = [0u8; 10];
    record[0..2].copy_from_slice(&src_oper.to_le_bytes());
    record[2..4].copy_from_slice(&dest_oper.to_le_bytes());
    record[4..6].copy_from_slice(&amount.to_le_bytes());
    record[6..8].copy_from_slice(&amount_src_oper.to_le_bytes());
    record[8..10].copy_from_slice(&trans_oper.to_le_bytes());
    record
}

#[derive(Clone, Debug)]
struct SampleSpec {
    name: String,
    start: u32,
    end: u32,
    sample_rate_hz: u32,
    original_pitch: u8,
    pitch_correction: i8,
}

#[derive(Default)]
pub struct Sf2Builder {
    bank_name: Option<String>,
    pcm: Vec<u8>,
    samples: Vec<SampleSpec>,
    instruments: Vec<(String, Vec<ZoneSpec>)>,
    presets: Vec<(String, u16, u16, Vec<ZoneSpec>)>,
    garbage: Vec<([u8; 4], usize)>,
}

impl Sf2Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bank_name(&mut self, name: &str) -> &mut Self {
        self.bank_name = Some(name.to_string());
        self
    }

    pub fn pcm_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.pcm = bytes.to_vec();
        self
    }

    pub fn pcm_i16(&mut self, samples: &[i16]) -> &mut Self {
        self.pcm = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        self
    }

    /// Registers a sample header; returns its index for `sample_zone`.
    /// `start`/`end` are sample-count offsets into the PCM block.
    pub fn sample(
        &mut self,
        name: &str,
        start: u32,
        end: u32,
        sample_rate_hz: u32,
        original_pitch: u8,
        pitch_correction: i8,
    ) -> u16 {
        self.samples.push(SampleSpec {
            name: name.to_string(),
            start,
            end,
            sample_rate_hz,
            original_pitch,
            pitch_correction,
        });
        (self.samples.len() - 1) as u16
    }

    pub fn instrument(&mut self, name: &str, zones: Vec<ZoneSpec>) -> u16 {
        self.instruments.push((name.to_string(), zones));
        (self.instruments.len() - 1) as u16
    }

    pub fn preset(&mut self, name: &str, patch: u16, bank: u16, zones: Vec<ZoneSpec>) -> &mut Self {
        self.presets.push((name.to_string(), patch, bank, zones));
        self
    }

    /// Appends `len` junk bytes to the body of the named pdta sub-chunk,
    /// making its length misaligned with the record stride.
    pub fn append_garbage(&mut self, id: [u8; 4], len: usize) -> &mut Self {
        self.garbage.push((id, len));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let info = self.build_info();
        let sdta = self.build_sdta();
        let pdta = self.build_pdta();

        let mut form = Vec::new();
        form.extend_from_slice(b"sfbk");
        write_chunk(&mut form, b"LIST", &info);
        write_chunk(&mut form, b"LIST", &sdta);
        write_chunk(&mut form, b"LIST", &pdta);

        let mut out = Vec::new();
        write_chunk(&mut out, b"RIFF", &form);
        out
    }

    fn garbage_for(&self, id: &[u8; 4]) -> usize {
        self.garbage
            .iter()
            .filter(|(g, _)| g == id)
            .map(|(_, len)| len)
            .sum()
    }

    fn write_subchunk(&self, out: &mut Vec<u8>, id: &[u8; 4], mut body: Vec<u8>) {
        body.extend(std::iter::repeat(0xAAu8).take(self.garbage_for(id)));
        write_chunk(out, id, &body);
    }

    fn build_info(&self) -> Vec<u8> {
        let mut info = Vec::new();
        info.extend_from_slice(b"INFO");
        self.write_subchunk(&mut info, b"ifil", vec![2, 0, 1, 0]);
        if let Some(name) = &self.bank_name {
            let mut body = name.as_bytes().to_vec();
            body.push(0);
            self.write_subchunk(&mut info, b"INAM", body);
        }
        info
    }

    fn build_sdta(&self) -> Vec<u8> {
        let mut sdta = Vec::new();
        sdta.extend_from_slice(b"sdta");
        self.write_subchunk(&mut sdta, b"smpl", self.pcm.clone());
        sdta
    }

    fn build_pdta(&self) -> Vec<u8> {
        let (phdr, pbag, pgen, pmod) = build_object_tables(
            self.presets
                .iter()
                .map(|(name, patch, bank, zones)| {
                    let mut header = fixed_name(name).to_vec();
                    header.extend_from_slice(&patch.to_le_bytes());
                    header.extend_from_slice(&bank.to_le_bytes());
                    (header, zones.as_slice())
                })
                .collect(),
            b"EOP",
            4,
            // library/genre/morphology trailer
            12,
        );
        let (inst, ibag, igen, imod) = build_object_tables(
            self.instruments
                .iter()
                .map(|(name, zones)| (fixed_name(name).to_vec(), zones.as_slice()))
                .collect(),
            b"EOI",
            0,
            0,
        );

        let mut pdta = Vec::new();
        pdta.extend_from_slice(b"pdta");
        self.write_subchunk(&mut pdta, b"phdr", phdr);
        self.write_subchunk(&mut pdta, b"pbag", pbag);
        self.write_subchunk(&mut pdta, b"pmod", pmod);
        self.write_subchunk(&mut pdta, b"pgen", pgen);
        self.write_subchunk(&mut pdta, b"inst", inst);
        self.write_subchunk(&mut pdta, b"ibag", ibag);
        self.write_subchunk(&mut pdta, b"imod", imod);
        self.write_subchunk(&mut pdta, b"igen", igen);
        self.write_subchunk(&mut pdta, b"shdr", self.build_shdr());
        pdta
    }

    fn build_shdr(&self) -> Vec<u8> {
        let mut shdr = Vec::new();
        for sample in &self.samples {
            shdr.extend_from_slice(&fixed_name(&sample.name));
            shdr.extend_from_slice(&sample.start.to_le_bytes());
            shdr.extend_from_slice(&sample.end.to_le_bytes());
            shdr.extend_from_slice(&0u32.to_le_bytes());
            shdr.extend_from_slice(&0u32.to_le_bytes());
            shdr.extend_from_slice(&sample.sample_rate_hz.to_le_bytes());
            shdr.push(sample.original_pitch);
            shdr.push(sample.pitch_correction as u8);
            shdr.extend_from_slice(&0u16.to_le_bytes());
            shdr.extend_from_slice(&1u16.to_le_bytes());
        }
        shdr.extend_from_slice(&fixed_name("EOS"));
        shdr.extend(std::iter::repeat(0u8).take(26));
        shdr
    }
}

/// Builds the header/bag/gen/mod table quartet shared by the preset and
/// instrument sides. Each object's prefix is the fixed name field plus
/// `mid_len` side-specific bytes before the bag index; `trailer_len` zero
/// bytes follow the bag index (phdr only).
fn build_object_tables(
    objects: Vec<(Vec<u8>, &[ZoneSpec])>,
    terminal_name: &[u8],
    mid_len: usize,
    trailer_len: usize,
) -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut headers = Vec::new();
    let mut bags = Vec::new();
    let mut gens = Vec::new();
    let mut mods = Vec::new();
    let mut bag_count: u16 = 0;
    let mut gen_count: u16 = 0;
    let mut mod_count: u16 = 0;

    for (prefix, zones) in &objects {
        headers.extend_from_slice(prefix);
        headers.extend_from_slice(&bag_count.to_le_bytes());
        headers.extend(std::iter::repeat(0u8).take(trailer_len));
        for zone in *zones {
            bags.extend_from_slice(&gen_count.to_le_bytes());
            bags.extend_from_slice(&mod_count.to_le_bytes());
            bag_count += 1;
            for (oper, amount) in &zone.generators {
                gens.extend_from_slice(&oper.to_le_bytes());
                gens.extend_from_slice(&amount.to_le_bytes());
                gen_count += 1;
            }
            for modulator in &zone.modulators {
                mods.extend_from_slice(modulator);
                mod_count += 1;
            }
        }
    }

    // terminal header record pointing at the terminal bag
    let name = std::str::from_utf8(terminal_name).unwrap_or("EOX");
    headers.extend_from_slice(&fixed_name(name));
    headers.extend(std::iter::repeat(0u8).take(mid_len));
    headers.extend_from_slice(&bag_count.to_le_bytes());
    headers.extend(std::iter::repeat(0u8).take(trailer_len));

    // terminal bag/gen/mod records
    bags.extend_from_slice(&gen_count.to_le_bytes());
    bags.extend_from_slice(&mod_count.to_le_bytes());
    gens.extend_from_slice(&[0u8; 4]);
    mods.extend_from_slice(&[0u8; 10]);

    (headers, bags, gens, mods)
}

fn fixed_name(name: &str) -> [u8; 20] {
    let mut field = [0u8; 20];
    let bytes = name.as_bytes();
    let len = bytes.len().min(19);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

fn write_chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    if body.len() % 2 == 1 {
        out.push(0);
    }
}
