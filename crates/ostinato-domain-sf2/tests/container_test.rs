use ostinato_domain_sf2::riff::{read_container, FourCc};
use ostinato_domain_sf2::testutil::{sample_zone, Sf2Builder};
use ostinato_domain_sf2::{load_sf2_bytes, FormatError, LoadError};

fn minimal_builder() -> Sf2Builder {
    let mut builder = Sf2Builder::new();
    builder.bank_name("Container Test");
    builder.pcm_i16(&[0, 100, -100, 0]);
    let sample = builder.sample("S", 0, 4, 44_100, 60, 0);
    builder.instrument("I", vec![sample_zone(sample)]);
    builder
}

#[test]
fn valid_container_indexes_all_three_lists() {
    let bytes = minimal_builder().build();
    let container = read_container(&bytes).unwrap();

    assert!(container.info_chunk(FourCc(*b"INAM")).is_some());
    assert!(container.sdta_chunk(FourCc(*b"smpl")).is_some());
    for id in [b"phdr", b"pbag", b"pgen", b"pmod", b"inst", b"ibag", b"igen", b"imod", b"shdr"] {
        assert!(container.pdta_chunk(FourCc(*id)).is_ok(), "missing {:?}", id);
    }
}

#[test]
fn chunk_ranges_do_not_copy_payloads() {
    let bytes = minimal_builder().build();
    let container = read_container(&bytes).unwrap();

    let smpl = container.sdta_chunk(FourCc(*b"smpl")).unwrap();
    assert_eq!(smpl.range.len, 8);
    assert_eq!(
        smpl.range.slice(&bytes),
        &[0, 0, 100, 0, 156, 255, 0, 0][..]
    );
}

#[test]
fn rejects_non_riff_data() {
    let err = read_container(b"MThd\x00\x00\x00\x06").unwrap_err();
    assert_eq!(err, FormatError::NotASoundFont);
}

#[test]
fn rejects_wrong_form_type() {
    let mut bytes = minimal_builder().build();
    bytes[8..12].copy_from_slice(b"WAVE");
    assert_eq!(read_container(&bytes).unwrap_err(), FormatError::NotASoundFont);
}

#[test]
fn rejects_truncated_stream() {
    let bytes = minimal_builder().build();
    // cut inside the pdta list
    let cut = bytes.len() - 30;
    let err = read_container(&bytes[..cut]).unwrap_err();
    assert!(matches!(
        err,
        FormatError::Truncated | FormatError::ChunkOverrun { .. }
    ));
}

#[test]
fn rejects_declared_length_past_end_of_stream() {
    let mut bytes = minimal_builder().build();
    // inflate the RIFF size field beyond the actual data
    let inflated = (bytes.len() as u32) * 2;
    bytes[4..8].copy_from_slice(&inflated.to_le_bytes());
    assert!(matches!(
        read_container(&bytes).unwrap_err(),
        FormatError::ChunkOverrun { .. }
    ));
}

#[test]
fn misaligned_record_stride_fails_decode() {
    let mut builder = minimal_builder();
    builder.append_garbage(*b"inst", 3);
    let err = load_sf2_bytes(&builder.build()).unwrap_err();
    match err {
        LoadError::Format(FormatError::MisalignedRecords { id, stride, .. }) => {
            assert_eq!(id, FourCc(*b"inst"));
            assert_eq!(stride, 22);
        }
        other => panic!("expected misaligned records error, got {:?}", other),
    }
}

#[test]
fn misaligned_sample_header_stride_fails_decode() {
    let mut builder = minimal_builder();
    builder.append_garbage(*b"shdr", 1);
    assert!(matches!(
        load_sf2_bytes(&builder.build()).unwrap_err(),
        LoadError::Format(FormatError::MisalignedRecords { .. })
    ));
}
