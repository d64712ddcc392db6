use fieldseal_crypto::CryptoError;

#[test]
fn error_display_configuration() {
    let err = CryptoError::Configuration("no key".into());
    assert!(format!("{err}").contains("configuration error"));
    assert!(format!("{err}").contains("no key"));
}

#[test]
fn error_display_authentication() {
    let err = CryptoError::Authentication("tampered".into());
    assert!(format!("{err}").contains("authentication failed"));
}

#[test]
fn error_display_encryption() {
    let err = CryptoError::Encryption("oops".into());
    assert!(format!("{err}").contains("encryption failed"));
}

#[test]
fn error_display_hashing() {
    let err = CryptoError::Hashing("bad params".into());
    assert!(format!("{err}").contains("hashing failed"));
}

#[test]
fn error_from_utf8() {
    let utf8_err = String::from_utf8(vec![0xff]).unwrap_err();
    let err: CryptoError = utf8_err.into();
    assert!(format!("{err}").contains("UTF-8"));
}

#[test]
fn error_is_debug() {
    let err = CryptoError::Encryption("test".into());
    let _ = format!("{err:?}");
}
