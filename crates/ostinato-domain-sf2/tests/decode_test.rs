use ostinato_domain_sf2::testutil::{global_zone, raw_modulator, sample_zone, zone, Sf2Builder};
use ostinato_domain_sf2::{load_sf2_bytes, GeneratorType, RenderError};

fn one_instrument_bank() -> Sf2Builder {
    let mut builder = Sf2Builder::new();
    builder.bank_name("Decode Test Bank");
    builder.pcm_i16(&[0, 1000, 2000, 3000, 4000, 5000]);
    let sample = builder.sample("Pluck", 1, 5, 32_000, 57, -25);
    builder.instrument("Pluck Inst", vec![sample_zone(sample)]);
    builder.preset("Pluck Preset", 3, 1, vec![zone(vec![(41, 0)])]);
    builder
}

#[test]
fn round_trips_a_minimal_bank() {
    let bank = load_sf2_bytes(&one_instrument_bank().build()).unwrap();

    assert_eq!(bank.name(), "Decode Test Bank");
    assert_eq!(bank.version().major, 2);
    assert_eq!(bank.instrument_count(), 1);
    assert_eq!(bank.instrument_name(0).unwrap(), "Pluck Inst");

    let instrument = &bank.instruments()[0];
    assert_eq!(instrument.zones.len(), 1);
    let generators = &instrument.zones[0].generators;
    assert_eq!(generators.len(), 1);
    assert_eq!(generators[0].kind(), GeneratorType::SampleId);
    assert_eq!(generators[0].amount_u16(), 0);

    assert_eq!(bank.sample_headers().len(), 1);
    let header = &bank.sample_headers()[0];
    assert_eq!(header.name, "Pluck");
    assert_eq!(header.start, 1);
    assert_eq!(header.end, 5);
    assert_eq!(header.sample_rate_hz, 32_000);
    assert_eq!(header.original_pitch, 57);
    assert_eq!(header.pitch_correction, -25);

    assert_eq!(bank.pcm().len(), 12);
}

#[test]
fn round_trips_presets() {
    let bank = load_sf2_bytes(&one_instrument_bank().build()).unwrap();

    assert_eq!(bank.preset_count(), 1);
    assert_eq!(bank.preset_name(0).unwrap(), "Pluck Preset");
    let preset = &bank.presets()[0];
    assert_eq!(preset.patch, 3);
    assert_eq!(preset.bank, 1);
    assert_eq!(
        preset.zones[0]
            .generator(GeneratorType::Instrument)
            .unwrap()
            .amount_u16(),
        0
    );
}

#[test]
fn keeps_empty_global_zones() {
    let mut builder = Sf2Builder::new();
    builder.pcm_i16(&[0, 1, 2, 3]);
    let sample = builder.sample("S", 0, 4, 44_100, 60, 0);
    builder.instrument("Layered", vec![global_zone(), sample_zone(sample)]);
    let bank = load_sf2_bytes(&builder.build()).unwrap();

    let zones = &bank.instruments()[0].zones;
    assert_eq!(zones.len(), 2);
    assert!(zones[0].generators.is_empty());
    assert!(zones[0].is_global());
    assert!(!zones[1].is_global());

    // the scan skips the global zone and lands on the playable one
    let header = bank.first_playable_sample(0).unwrap();
    assert_eq!(header.name, "S");
}

#[test]
fn round_trips_modulators() {
    let mut builder = Sf2Builder::new();
    builder.pcm_i16(&[0, 1]);
    let sample = builder.sample("S", 0, 2, 44_100, 60, 0);
    let mut z = sample_zone(sample);
    z.modulators.push(raw_modulator(0x0502, 48, -96, 0, 0));
    builder.instrument("Modulated", vec![z]);
    let bank = load_sf2_bytes(&builder.build()).unwrap();

    let modulators = &bank.instruments()[0].zones[0].modulators;
    assert_eq!(modulators.len(), 1);
    assert_eq!(modulators[0].src_oper, 0x0502);
    assert_eq!(modulators[0].dest_oper, 48);
    assert_eq!(modulators[0].amount, -96);
}

#[test]
fn unpitched_sample_maps_to_middle_c() {
    let mut builder = Sf2Builder::new();
    builder.pcm_i16(&[0, 1]);
    builder.sample("Perc", 0, 2, 44_100, 255, 0);
    builder.instrument("Perc Inst", vec![sample_zone(0)]);
    let bank = load_sf2_bytes(&builder.build()).unwrap();

    assert_eq!(bank.sample_headers()[0].original_pitch, 60);
}

#[test]
fn instrument_name_rejects_out_of_range_index() {
    let bank = load_sf2_bytes(&one_instrument_bank().build()).unwrap();

    let err = bank.instrument_name(bank.instrument_count()).unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.count, 1);
    assert!(bank.instrument_name(usize::MAX).is_err());
}

#[test]
fn first_playable_sample_rejects_out_of_range_index() {
    let bank = load_sf2_bytes(&one_instrument_bank().build()).unwrap();
    assert!(matches!(
        bank.first_playable_sample(7).unwrap_err(),
        RenderError::Index(_)
    ));
}

#[test]
fn instrument_without_sample_id_has_no_playable_sample() {
    let mut builder = Sf2Builder::new();
    builder.pcm_i16(&[0, 1]);
    builder.sample("S", 0, 2, 44_100, 60, 0);
    // only a pan generator, no SampleId
    builder.instrument("Unplayable", vec![zone(vec![(17, 0)])]);
    let bank = load_sf2_bytes(&builder.build()).unwrap();

    let err = bank.first_playable_sample(0).unwrap_err();
    match err {
        RenderError::NotFound(not_found) => assert_eq!(not_found.instrument, "Unplayable"),
        other => panic!("expected not-found error, got {:?}", other),
    }
}

#[test]
fn dangling_sample_reference_fails_at_load() {
    let mut builder = Sf2Builder::new();
    builder.pcm_i16(&[0, 1]);
    builder.sample("S", 0, 2, 44_100, 60, 0);
    builder.instrument("Dangling", vec![sample_zone(9)]);
    assert!(load_sf2_bytes(&builder.build()).is_err());
}

#[test]
fn reload_is_idempotent() {
    let bytes = one_instrument_bank().build();
    let first = load_sf2_bytes(&bytes).unwrap();
    let second = load_sf2_bytes(&bytes).unwrap();

    assert_eq!(first.name(), second.name());
    assert_eq!(first.instrument_count(), second.instrument_count());
    assert_eq!(first.preset_count(), second.preset_count());
    assert_eq!(
        first.sample_headers().len(),
        second.sample_headers().len()
    );
    assert_eq!(first.sample_headers()[0].name, second.sample_headers()[0].name);
    assert_eq!(first.pcm(), second.pcm());
}
