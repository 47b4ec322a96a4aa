//! Snapshot tests for whole-document conversion
//!
//! These tests convert JSON fixture documents and snapshot the Markdown so
//! that changes to the writer output are caught.

use std::fs;
use std::path::PathBuf;

use pm2md_core::{Bullet, HardBreak, WriterOptions, convert};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn convert_fixture(name: &str, options: &WriterOptions) -> String {
    let path = fixtures_dir().join(format!("{}.json", name));
    let source = fs::read_to_string(&path).expect("Failed to read fixture file");
    convert(&source, options).expect("Failed to convert fixture")
}

#[test]
fn test_newsletter() {
    let markdown = convert_fixture("newsletter", &WriterOptions::default());
    insta::assert_snapshot!(markdown, @r#"
    # Weekly Notes

    This week I tried **Rust** and ***liked it***. Read [the book](https://doc.rust-lang.org/book/).

    * Ownership
      1. Move
      2. Borrow
    * Use `cargo test`

    > Fearless\
    > concurrency

    ```rust
    fn main() {
        println!("hi");
    }
    ```

    ---

    Thanks for reading!
    "#);
}

#[test]
fn test_newsletter_alternate_options() {
    let options = WriterOptions {
        bullet: Bullet::Dash,
        hard_break: HardBreak::Spaces,
    };
    let markdown = convert_fixture("newsletter", &options);
    assert!(markdown.contains("- Ownership\n  1. Move"));
    assert!(markdown.contains("> Fearless  \n> concurrency"));
}

#[test]
fn test_escapes() {
    let markdown = convert_fixture("escapes", &WriterOptions::default());
    assert_eq!(
        markdown,
        "\\# Not a heading\n\n\
         2024\\. A good year\n\n\
         Use \\*stars\\* and \\[brackets\\] with snake_case\n\n\
         Code: ``a`b``"
    );
}

#[test]
fn test_conversion_is_deterministic() {
    let first = convert_fixture("newsletter", &WriterOptions::default());
    for _ in 0..5 {
        assert_eq!(convert_fixture("newsletter", &WriterOptions::default()), first);
    }
}
