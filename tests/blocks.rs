//! Tests for the individual block decoders and the Map directory.

mod common;

use common::{
    Body, INDEX_RAW, SPACING_RAW, assert_close, data_points, fixed_params, general_params,
    key_events, link_params, supplier_params,
};
use sor_rs::{
    Error, Result,
    blocks::{
        BlockDirectory, BlockParse, ByteCursor, ChecksumRecord, DataPoints, DecodeContext,
        EventKind, EventOrigin, FixedParameters, GeneralParameters, KeyEvents, LinkParameters,
        ProprietaryBlock, Revision, SPEED_OF_LIGHT, SupplierParameters, crc16_ccitt,
    },
};

/// Prepend the revision 2 name header.
fn named(name: &str, body: Vec<u8>) -> Vec<u8> {
    let mut bytes = name.as_bytes().to_vec();
    bytes.push(0);
    bytes.extend_from_slice(&body);
    bytes
}

fn rev2() -> DecodeContext {
    DecodeContext::new(Revision::V2)
}

fn rev1() -> DecodeContext {
    DecodeContext::new(Revision::V1)
}

#[test]
fn map_directory_lists_blocks_in_order() -> Result<()> {
    let data = common::SorBuilder::new()
        .block("FxdParams", fixed_params(true, 3))
        .block("DataPts", data_points(10_000, &[100, 200, 300]))
        .build();
    let directory = BlockDirectory::from_bytes(&data)?;

    assert_eq!(directory.revision, Revision::V2);
    assert_eq!(directory.version, 200);
    assert_eq!(directory.version_text, "2.00");
    assert_eq!(directory.block_count, 3);

    let names: Vec<_> = directory.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["FxdParams", "DataPts"]);

    let fixed = directory.entry("FxdParams").unwrap();
    let points = directory.entry("DataPts").unwrap();
    assert_eq!(fixed.offset, directory.length as usize);
    assert_eq!(points.offset, fixed.end());
    assert_eq!(points.order, 2);
    assert_eq!(directory.total_length(), data.len());
    assert_eq!(directory.unread, 0);
    Ok(())
}

#[test]
fn map_directory_revision1() -> Result<()> {
    let data = common::SorBuilder::revision1()
        .block("SupParams", supplier_params())
        .build();
    let directory = BlockDirectory::from_bytes(&data)?;
    assert_eq!(directory.revision, Revision::V1);
    assert_eq!(directory.version_text, "1.00");
    assert_eq!(directory.entries()[0].offset, directory.length as usize);
    Ok(())
}

#[test]
fn map_directory_rejects_bad_input() {
    // No signature and no plausible revision 1 version
    let result = BlockDirectory::from_bytes(b"NotASorFile at all");
    assert!(matches!(result, Err(Error::InvalidDirectory(_))));

    // Signature with an unknown revision
    let data = Body::new().text("Map\0").u16(900).u32(12).u16(1).build();
    assert!(matches!(
        BlockDirectory::from_bytes(&data),
        Err(Error::InvalidDirectory(_))
    ));

    // Too short for the header
    assert!(matches!(
        BlockDirectory::from_bytes(b"Map\0\xc8"),
        Err(Error::InvalidDirectory(_))
    ));

    // Zero block count
    let data = Body::new().text("Map\0").u16(200).u32(12).u16(0).build();
    assert!(matches!(
        BlockDirectory::from_bytes(&data),
        Err(Error::InvalidDirectory(_))
    ));
}

#[test]
fn map_directory_block_count_must_match_entries() {
    // Declares three blocks but holds one entry
    let data = Body::new()
        .text("Map\0")
        .u16(200)
        .u32(26)
        .u16(3)
        .cstr("DataPts")
        .u16(200)
        .u32(0)
        .build();
    assert_eq!(data.len(), 26);
    match BlockDirectory::from_bytes(&data) {
        Err(Error::InvalidDirectory(cause)) => assert!(cause.contains("block count")),
        other => panic!("expected InvalidDirectory, got {other:?}"),
    }
}

#[test]
fn map_directory_detects_truncated_file() {
    let mut data = common::SorBuilder::new()
        .block("DataPts", data_points(10_000, &[1, 2, 3, 4]))
        .build();
    data.truncate(data.len() - 1);
    assert!(matches!(
        BlockDirectory::from_bytes(&data),
        Err(Error::TruncatedInput { .. })
    ));
}

#[test]
fn general_parameters_revision2() -> Result<()> {
    let bytes = named("GenParams", general_params(true));
    let mut cursor = ByteCursor::new(&bytes);
    let params = GeneralParameters::from_cursor(&mut cursor, &rev2())?;

    assert_eq!(cursor.remaining(), 0);
    assert_eq!(params.language, "EN");
    assert_eq!(params.cable_id, "CABLE-01");
    assert_eq!(params.fiber_id, "FIBER-007");
    let fiber_type = params.fiber_type.unwrap();
    assert_eq!(fiber_type.code, 652);
    assert!(fiber_type.description.starts_with("G.652"));
    assert_eq!(params.wavelength_nm, 1550);
    assert_eq!(params.location_a, "Central Office");
    assert_eq!(params.location_b, "Hut 12");
    assert_eq!(params.build_condition.code, "BC");
    assert_eq!(params.build_condition.description, "as-built");
    assert_close(params.user_offset_s, 1e-7);
    assert_eq!(params.user_offset_distance, Some(20));
    assert_eq!(params.operator, "night shift");
    assert_eq!(params.comments, "after repair");
    Ok(())
}

#[test]
fn general_parameters_revision1_has_no_extended_fields() -> Result<()> {
    let bytes = general_params(false);
    let mut cursor = ByteCursor::new(&bytes);
    let params = GeneralParameters::from_cursor(&mut cursor, &rev1())?;
    assert_eq!(cursor.remaining(), 0);
    assert_eq!(params.fiber_type, None);
    assert_eq!(params.user_offset_distance, None);
    assert_eq!(params.cable_code, "SMF-28");
    Ok(())
}

#[test]
fn block_header_must_name_the_block() {
    let bytes = named("SupParams", supplier_params());
    let mut cursor = ByteCursor::new(&bytes);
    match GeneralParameters::from_cursor(&mut cursor, &rev2()) {
        Err(Error::BlockHeaderMismatch { expected, found }) => {
            assert_eq!(expected, "GenParams");
            assert_eq!(found, "SupParams");
        }
        other => panic!("expected BlockHeaderMismatch, got {other:?}"),
    }
}

#[test]
fn supplier_parameters() -> Result<()> {
    let bytes = named("SupParams", supplier_params());
    let mut cursor = ByteCursor::new(&bytes);
    let params = SupplierParameters::from_cursor(&mut cursor, &rev2())?;
    assert_eq!(params.supplier, "Acme Photonics");
    assert_eq!(params.otdr, "OTDR-9000");
    assert_eq!(params.otdr_serial, "SN1234");
    assert_eq!(params.software, "4.2.1");
    assert_eq!(params.other, "");
    Ok(())
}

#[test]
fn fixed_parameters_converts_units() -> Result<()> {
    let bytes = named("FxdParams", fixed_params(true, 4));
    let mut cursor = ByteCursor::new(&bytes);
    let params = FixedParameters::from_cursor(&mut cursor, &rev2())?;
    assert_eq!(cursor.remaining(), 0);

    assert_eq!(params.date_time, 1_600_000_000);
    assert_eq!(params.date_time_utc.as_deref(), Some("2020-09-13T12:26:40Z"));
    assert_eq!(params.distance_unit.code, "mt");
    assert_eq!(params.distance_unit.description, "meters");
    assert_close(params.wavelength_nm, 1550.0);
    assert_eq!(params.pulse_widths_s.len(), 1);
    assert_close(params.pulse_width_s().unwrap(), 100e-9);
    assert_eq!(params.data_points_per_pulse, vec![4]);
    assert_eq!(params.number_of_data_points, 4);

    let ior = f64::from(INDEX_RAW) / 100_000.0;
    assert_close(params.index_of_refraction, ior);
    let spacing = f64::from(SPACING_RAW) * 1e-14;
    assert_close(params.sample_spacings_s[0], spacing);
    let resolution = spacing * SPEED_OF_LIGHT / ior;
    assert_close(params.resolution_m.unwrap(), resolution);
    assert_close(params.range_m.unwrap(), resolution * 4.0);

    assert_close(params.backscatter_coefficient_db, -80.0);
    assert_eq!(params.number_of_averages, 1000);
    assert_close(params.averaging_time_s.unwrap(), 30.0);
    // 250 units of 2e-5 km
    assert_close(params.acquisition_range_m, 5.0);
    assert_close(params.loss_threshold_db, 0.2);
    assert_close(params.reflection_threshold_db, -40.0);
    assert_close(params.end_of_fiber_threshold_db, 3.0);
    assert_eq!(params.trace_type.as_ref().unwrap().code, "ST");
    assert_eq!(params.display_window.unwrap().x2, 1000);
    Ok(())
}

#[test]
fn fixed_parameters_revision1() -> Result<()> {
    let bytes = fixed_params(false, 2);
    let mut cursor = ByteCursor::new(&bytes);
    let params = FixedParameters::from_cursor(&mut cursor, &rev1())?;
    assert_eq!(cursor.remaining(), 0);
    assert_eq!(params.acquisition_offset_distance, None);
    assert_eq!(params.averaging_time_s, None);
    assert_eq!(params.trace_type, None);
    assert_eq!(params.display_window, None);
    assert_eq!(params.number_of_data_points, 2);
    Ok(())
}

#[test]
fn fixed_parameters_rejects_zero_index() {
    let mut body = fixed_params(false, 2);
    // Group index follows date (4), unit (2), wavelength (2), offset (4),
    // pulse count (2), one pulse width (2), one spacing (4), one count (4).
    body[24..28].copy_from_slice(&0u32.to_le_bytes());
    let mut cursor = ByteCursor::new(&body);
    assert!(matches!(
        FixedParameters::from_cursor(&mut cursor, &rev1()),
        Err(Error::InvalidField { field: "index of refraction", .. })
    ));
}

#[test]
fn data_points_scale_samples() -> Result<()> {
    let bytes = named("DataPts", data_points(10_000, &[100, 200, 300]));
    let mut cursor = ByteCursor::new(&bytes);
    let mut points = DataPoints::from_cursor(&mut cursor, &rev2())?;
    assert_eq!(points.total_points, 3);
    assert_eq!(points.decoded_points, 3);
    assert_eq!(points.scale_groups[0].scale_factor, 10_000);
    assert_eq!(points.min_level_db, Some(1.0));
    assert_eq!(points.max_level_db, Some(3.0));
    assert_eq!(points.take_samples(), vec![1.0, 2.0, 3.0]);
    assert!(points.take_samples().is_empty());
    Ok(())
}

#[test]
fn data_points_multiple_scale_groups() -> Result<()> {
    let body = Body::new()
        .u32(3)
        .u16(2)
        .u32(2)
        .u16(1000)
        .u16(1000)
        .u16(2000)
        .u32(1)
        .u16(10_000)
        .u16(50)
        .build();
    let mut cursor = ByteCursor::new(&body);
    let mut points = DataPoints::from_cursor(&mut cursor, &rev1())?;
    assert_eq!(cursor.remaining(), 0);
    assert_eq!(points.scale_groups.len(), 2);
    assert_eq!(points.take_samples(), vec![1.0, 2.0, 0.5]);
    Ok(())
}

#[test]
fn data_points_short_block_keeps_partial_samples() -> Result<()> {
    let body = Body::new()
        .u32(4)
        .u16(1)
        .u32(4)
        .u16(10_000)
        .u16(100)
        .u16(200)
        .build();
    let mut cursor = ByteCursor::new(&body);
    let mut points = DataPoints::from_cursor(&mut cursor, &rev1())?;
    assert_eq!(points.total_points, 4);
    assert_eq!(points.decoded_points, 2);
    assert_eq!(points.take_samples(), vec![1.0, 2.0]);
    Ok(())
}

#[test]
fn key_events_revision2() -> Result<()> {
    let bytes = named(
        "KeyEvents",
        key_events(true, &[(1, 0, "1F9999LS"), (2, 100_000, "1E9999LS")]),
    );
    let ctx = rev2().with_index_of_refraction(1.5);
    let mut cursor = ByteCursor::new(&bytes);
    let events = KeyEvents::from_cursor(&mut cursor, &ctx)?;
    assert_eq!(cursor.remaining(), 0);
    assert_eq!(events.events.len(), 2);

    let end = &events.events[1];
    let expected = 1e-5 * SPEED_OF_LIGHT / 1.5;
    assert_eq!(end.number, 2);
    assert_close(end.distance_m, expected);
    assert_close(end.slope_db_per_km, 0.2);
    assert_close(end.splice_loss_db, 0.15);
    assert_close(end.reflection_loss_db, -45.0);
    assert_eq!(end.event_type.kind, EventKind::Reflective);
    assert_eq!(end.event_type.origin, EventOrigin::EndOfFiber);
    assert_close(end.start_of_current_event_m.unwrap(), expected);
    assert!(end.end_of_previous_event_m.unwrap() < expected);

    assert_close(events.summary.total_loss_db, 3.5);
    assert_close(events.summary.loss_end_m, expected);
    assert_close(events.summary.optical_return_loss_db.unwrap(), 32.0);
    assert_eq!(events.first_unsorted(), None);
    assert_eq!(events.end_of_fiber().map(|e| e.number), Some(2));
    Ok(())
}

#[test]
fn key_events_revision1_and_ordering() -> Result<()> {
    let bytes = key_events(false, &[(1, 80_000, "0F9999LS"), (2, 40_000, "0F9999LS")]);
    let mut cursor = ByteCursor::new(&bytes);
    let events = KeyEvents::from_cursor(&mut cursor, &rev1())?;
    assert_eq!(cursor.remaining(), 0);
    assert_eq!(events.events[0].peak_point_m, None);
    assert_eq!(events.summary.optical_return_loss_db, None);
    // File order is preserved
    assert_eq!(events.events[0].number, 1);
    assert_eq!(events.first_unsorted(), Some(2));
    assert!(events.end_of_fiber().is_none());
    Ok(())
}

#[test]
fn link_parameters_landmarks() -> Result<()> {
    let bytes = named("LnkParams", link_params(&[(1, 10_000), (2, 20_000)]));
    let ctx = rev2().with_index_of_refraction(1.0);
    let mut cursor = ByteCursor::new(&bytes);
    let link = LinkParameters::from_cursor(&mut cursor, &ctx)?;
    assert_eq!(cursor.remaining(), 0);
    assert_eq!(link.landmarks.len(), 2);

    let second = link.landmark(2).unwrap();
    assert_eq!(second.code, "MH");
    assert_close(second.location_m, 2e-6 * SPEED_OF_LIGHT);
    assert_eq!(second.sheath_units, "mt");
    assert_eq!(second.comment, "manhole");
    assert!(link.landmark(3).is_none());
    Ok(())
}

#[test]
fn checksum_covers_preceding_bytes() -> Result<()> {
    let mut file = b"Map\0 some blocks Cksum\0".to_vec();
    let start = file.len() - "Cksum\0".len();
    let crc = crc16_ccitt(&file);
    file.extend_from_slice(&crc.to_le_bytes());

    let mut cursor = ByteCursor::new(&file);
    cursor.skip(start)?;
    let mut window = cursor.window(file.len() - start)?;
    let mut record = ChecksumRecord::from_cursor(&mut window, &rev2())?;
    assert_eq!(record.covered_bytes, file.len() - 2);
    assert_eq!(record.stored, crc);
    assert!(record.validate(&file)?);
    assert_eq!(record.is_valid(), Some(true));
    Ok(())
}

#[test]
fn proprietary_block_strips_own_header() -> Result<()> {
    let bytes = named("AcmeVendor", vec![1, 2, 3]);
    let mut cursor = ByteCursor::new(&bytes);
    let block = ProprietaryBlock::from_cursor(&mut cursor, &rev2(), "AcmeVendor", bytes.len() as u32)?;
    assert_eq!(block.payload, vec![1, 2, 3]);
    assert_eq!(cursor.remaining(), 0);

    // A block that does not start with its name is kept whole
    let bytes = vec![9, 8, 7];
    let mut cursor = ByteCursor::new(&bytes);
    let block = ProprietaryBlock::from_cursor(&mut cursor, &rev2(), "AcmeVendor", 3)?;
    assert_eq!(block.payload, bytes);

    // Revision 1 blocks have no header to strip
    let bytes = named("AcmeVendor", vec![4]);
    let mut cursor = ByteCursor::new(&bytes);
    let block = ProprietaryBlock::from_cursor(&mut cursor, &rev1(), "AcmeVendor", 12)?;
    assert_eq!(block.payload, bytes);
    Ok(())
}
