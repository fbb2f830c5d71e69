use ostinato_domain_sf2::render::{extract_pcm, frequency_hz, normalize_pcm};
use ostinato_domain_sf2::testutil::{sample_zone, Sf2Builder};
use ostinato_domain_sf2::{load_sf2_bytes, FormatError, RangeError, RenderError, SampleHeader};

fn header(name: &str, start: u32, end: u32) -> SampleHeader {
    SampleHeader {
        name: name.to_string(),
        start,
        end,
        loop_start: start,
        loop_end: end,
        sample_rate_hz: 44_100,
        original_pitch: 60,
        pitch_correction: 0,
        sample_link: 0,
        sample_type: 1,
    }
}

#[test]
fn normalization_maps_the_i16_extremes() {
    let raw: Vec<u8> = [0i16, 32767, -32768, -1]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();
    let floats = normalize_pcm(&raw).unwrap();

    assert_eq!(floats[0], 0.0);
    assert!((floats[1] - 32767.0 / 32768.0).abs() < 1e-7);
    assert_eq!(floats[2], -1.0);
    assert!((floats[3] + 1.0 / 32768.0).abs() < 1e-7);
}

#[test]
fn odd_length_pcm_is_rejected() {
    assert_eq!(
        normalize_pcm(&[1, 2, 3]).unwrap_err(),
        FormatError::OddPcmLength(3)
    );
}

#[test]
fn pitch_resolution_follows_equal_temperament() {
    assert!((frequency_hz(69, 0) - 440.0).abs() < 1e-3);
    assert!((frequency_hz(81, 0) - 880.0).abs() < 1e-3);
    assert!((frequency_hz(57, 0) - 220.0).abs() < 1e-3);
    // +100 cents is exactly one semitone
    assert!((frequency_hz(68, 100) - 440.0).abs() < 1e-3);
}

#[test]
fn extraction_slices_sample_offsets_as_byte_pairs() {
    let pcm: Vec<u8> = (0u8..12).collect();
    let slice = extract_pcm(&pcm, &header("S", 1, 4)).unwrap();
    assert_eq!(slice, &pcm[2..8]);
}

#[test]
fn extraction_rejects_inverted_bounds() {
    let pcm = vec![0u8; 400];
    match extract_pcm(&pcm, &header("Backwards", 100, 50)).unwrap_err() {
        RangeError::InvertedBounds { name, start, end } => {
            assert_eq!(name, "Backwards");
            assert_eq!(start, 100);
            assert_eq!(end, 50);
        }
        other => panic!("expected inverted bounds, got {:?}", other),
    }
    // zero-length ranges are inverted too
    assert!(extract_pcm(&pcm, &header("Empty", 5, 5)).is_err());
}

#[test]
fn extraction_rejects_out_of_bounds_ranges() {
    let pcm = vec![0u8; 8];
    match extract_pcm(&pcm, &header("Long", 0, 100)).unwrap_err() {
        RangeError::OutOfBounds { pcm_len, .. } => assert_eq!(pcm_len, 8),
        other => panic!("expected out of bounds, got {:?}", other),
    }
}

#[test]
fn render_sample_combines_extraction_normalization_and_pitch() {
    let mut builder = Sf2Builder::new();
    builder.pcm_i16(&[0, 16384, -16384, 32767]);
    let sample = builder.sample("Sine", 0, 4, 22_050, 81, 0);
    builder.instrument("Sine Inst", vec![sample_zone(sample)]);
    let bank = load_sf2_bytes(&builder.build()).unwrap();

    let rendered = bank.render_sample(0).unwrap();
    assert_eq!(rendered.name, "Sine");
    assert_eq!(rendered.frames(), 4);
    assert_eq!(rendered.sample_rate_hz, 22_050);
    assert!((rendered.frequency_hz - 880.0).abs() < 1e-3);
    assert_eq!(rendered.waveform[0], 0.0);
    assert_eq!(rendered.waveform[1], 0.5);
    assert_eq!(rendered.waveform[2], -0.5);
    assert!((rendered.duration_secs() - 4.0 / 22_050.0).abs() < 1e-9);
}

#[test]
fn render_sample_surfaces_range_errors() {
    let mut builder = Sf2Builder::new();
    builder.pcm_i16(&[0, 1]);
    // header claims more samples than the smpl chunk holds
    builder.sample("Overlong", 0, 1_000, 44_100, 60, 0);
    builder.instrument("Overlong Inst", vec![sample_zone(0)]);
    let bank = load_sf2_bytes(&builder.build()).unwrap();

    assert!(matches!(
        bank.render_sample(0).unwrap_err(),
        RenderError::Range(RangeError::OutOfBounds { .. })
    ));
}
