use super::*;
use std::collections::HashSet;

#[test]
fn codes_are_unique() {
    let strings: HashSet<&str> = ErrorCode::ALL.iter().map(ErrorCode::as_str).collect();
    assert_eq!(strings.len(), ErrorCode::ALL.len());
}

#[test]
fn from_str_round_trips() {
    for code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(*code));
    }
    assert_eq!("w2001".parse::<ErrorCode>(), Ok(ErrorCode::W2001));
    assert_eq!("E4242".parse::<ErrorCode>(), Err(()));
}

#[test]
fn warning_and_phase_ranges() {
    assert!(ErrorCode::W0001.is_warning());
    assert!(!ErrorCode::E2003.is_warning());
    assert!(ErrorCode::E0002.is_literal_error());
    assert!(!ErrorCode::E2001.is_literal_error());
}

#[test]
fn every_code_has_a_description() {
    for code in ErrorCode::ALL {
        assert!(!code.description().is_empty(), "{code} has no description");
    }
}
