use base::CancelToken;

#[test]
fn test_cancel_token_starts_clear() {
    let token = CancelToken::new();
    assert!(!token.is_canceled());
}

#[test]
fn test_cancel_token_shared_between_clones() {
    let token = CancelToken::new();
    let observer = token.clone();
    token.cancel();
    assert!(observer.is_canceled());

    // idempotent
    observer.cancel();
    assert!(token.is_canceled());
}

#[test]
fn test_cancel_token_across_threads() {
    let token = CancelToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();
    assert!(token.is_canceled());
}
