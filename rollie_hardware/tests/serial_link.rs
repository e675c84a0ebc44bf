use std::io::Cursor;
use std::time::{Duration, Instant};

use rollie_hardware::SerialTagLink;
use rollie_hardware::error::HwError;
use rollie_traits::{TagLink, TagPoll};

/// Poll until something arrives; the reader thread runs concurrently.
fn poll_until_present<W: std::io::Write>(link: &mut SerialTagLink<W>) -> TagPoll {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let poll = link.poll().expect("poll");
        if poll.present || Instant::now() >= deadline {
            return poll;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn parsed_line_is_reported_with_record() {
    let input = Cursor::new(b"UID 04A2 :12000 :70100\n".to_vec());
    let mut link = SerialTagLink::spawn(input, Vec::new());
    let poll = poll_until_present(&mut link);
    assert!(poll.present);
    let rec = poll.record.expect("record");
    assert_eq!(rec.reference_weight_g, 12000.0);
    assert_eq!(rec.history, vec![70100.0]);
}

#[test]
fn garbage_line_does_not_count_as_a_tag() {
    let input = Cursor::new(b"UID 04A2\nchecksum error\n".to_vec());
    let mut link = SerialTagLink::spawn(input, Vec::new());
    let deadline = Instant::now() + Duration::from_secs(2);
    // Both lines are drained before the link reports closed.
    let err = loop {
        match link.poll() {
            Err(e) => break e,
            Ok(p) => {
                assert_eq!(p, TagPoll::absent());
                assert!(Instant::now() < deadline, "link never reported closed");
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    };
    assert!(matches!(
        err.downcast_ref::<HwError>(),
        Some(HwError::LinkClosed)
    ));
}

#[test]
fn garbage_before_a_good_line_keeps_the_good_record() {
    let input = Cursor::new(b"checksum error\nUID 04A2 :9000\n".to_vec());
    let mut link = SerialTagLink::spawn(input, Vec::new());
    let poll = poll_until_present(&mut link);
    assert!(poll.present);
    assert_eq!(poll.record.expect("record").reference_weight_g, 9000.0);
}

#[test]
fn closed_link_is_reported_once() {
    let mut link = SerialTagLink::spawn(Cursor::new(Vec::new()), Vec::new());
    let deadline = Instant::now() + Duration::from_secs(2);
    let err = loop {
        match link.poll() {
            Err(e) => break e,
            Ok(p) => {
                assert!(!p.present);
                assert!(Instant::now() < deadline, "link never reported closed");
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    };
    assert!(matches!(
        err.downcast_ref::<HwError>(),
        Some(HwError::LinkClosed)
    ));
    assert_eq!(link.poll().unwrap(), TagPoll::absent());
}

#[test]
fn write_weight_emits_colon_line() {
    let mut out = Vec::new();
    {
        let mut link = SerialTagLink::spawn(Cursor::new(Vec::new()), &mut out);
        link.write_weight(70_349.6).unwrap();
        link.write_weight(12.0).unwrap();
    }
    assert_eq!(String::from_utf8(out).unwrap(), ":70350\n:12\n");
}
