use crate::error::{Error, Limit};
use crate::reader::{Reader, ReaderBuilder};
use crate::settings::{EscapeMode, Terminator};
use crate::source::TextSource;

const CAPACITIES: &[usize] = &[1, 2, 3, 7, 1024];

fn builder<F: FnOnce(&mut ReaderBuilder)>(config: F) -> ReaderBuilder {
    let mut b = ReaderBuilder::new();
    config(&mut b);
    b
}

fn collect(rdr: &mut Reader<TextSource>) -> Vec<Vec<String>> {
    let mut rows = vec![];
    while rdr.read_record().unwrap() {
        assert!(rdr.check_invariants());
        rows.push(rdr.values().to_vec());
    }
    assert!(rdr.check_invariants());
    rows
}

macro_rules! parses_to {
    ($name:ident, $csv:expr, $vec:expr) => {
        parses_to!($name, $csv, $vec, |_| {});
    };
    ($name:ident, $csv:expr, $vec:expr, $config:expr) => {
        #[test]
        fn $name() {
            let mut b = builder($config);
            let expected: Vec<Vec<&str>> = $vec;
            for &cap in CAPACITIES {
                let mut rdr = b.buffer_capacity(cap).from_text($csv).unwrap();
                let got = collect(&mut rdr);
                assert_eq!(got, expected, "buffer capacity {}", cap);
            }
        }
    };
}

parses_to!(one_row_one_field, "a", vec![vec!["a"]]);
parses_to!(one_row_many_fields, "a,b,c", vec![vec!["a", "b", "c"]]);
parses_to!(one_row_trailing_comma, "a,b,", vec![vec!["a", "b", ""]]);
parses_to!(one_row_one_field_lf, "a\n", vec![vec!["a"]]);
parses_to!(
    many_rows_many_fields,
    "a,b,c\nx,y,z",
    vec![vec!["a", "b", "c"], vec!["x", "y", "z"]]
);
parses_to!(only_delimiters, ",,", vec![vec!["", "", ""]]);
parses_to!(empty_string_no_rows, "", vec![]);
parses_to!(only_terminators_no_rows, "\n\r\n\r", vec![]);
parses_to!(
    crlf_terminators,
    "a,b\r\nc,d\r\n\r\ne",
    vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]
);
parses_to!(
    cr_terminators,
    "a\rb\r",
    vec![vec!["a"], vec!["b"]]
);
parses_to!(
    empty_lines_kept,
    "a\n\nb\n\n",
    vec![vec!["a"], vec![""], vec!["b"], vec![""]],
    |b| {
        b.skip_empty_records(false);
    }
);
parses_to!(
    empty_lines_kept_crlf,
    "a\r\n\r\nb",
    vec![vec!["a"], vec![""], vec!["b"]],
    |b| {
        b.skip_empty_records(false);
    }
);

parses_to!(quoted_field, "\"a,b\",c", vec![vec!["a,b", "c"]]);
parses_to!(
    quoted_terminators,
    "\"a\r\nb\",\"c\nd\"\n",
    vec![vec!["a\r\nb", "c\nd"]]
);
parses_to!(doubled_qualifier, "\"a\"\"b\",c", vec![vec!["a\"b", "c"]]);
parses_to!(only_doubled_qualifier, "\"\"\"\"", vec![vec!["\""]]);
parses_to!(empty_quoted_field, "\"\"\n", vec![vec![""]]);
parses_to!(unterminated_quote, "a,\"b,c\nd", vec![vec!["a", "b,c\nd"]]);
parses_to!(text_after_closing_qualifier, "\"ab\"cd,e", vec![vec!["abcd", "e"]]);
parses_to!(
    escapes_after_closing_qualifier,
    "\"a\"\\,b\\x41,c\n\"d\"\\\"",
    vec![vec!["a,bA", "c"], vec!["d\""]],
    |b| {
        b.escape_mode(EscapeMode::Backslash);
    }
);
parses_to!(
    qualifier_not_doubled,
    "\"a\"\"b\"",
    vec![vec!["a\"b\""]],
    |b| {
        b.escape_mode(EscapeMode::None);
    }
);
parses_to!(
    qualifier_disabled,
    "\"a,b\"",
    vec![vec!["\"a", "b\""]],
    |b| {
        b.use_text_qualifier(false);
    }
);
parses_to!(
    custom_qualifier,
    "'a,b','it''s'",
    vec![vec!["a,b", "it's"]],
    |b| {
        b.text_qualifier('\'');
    }
);

parses_to!(
    trimmed_fields,
    "  a  ,\t b \n",
    vec![vec!["a", "b"]]
);
parses_to!(
    untrimmed_fields,
    " a , b ",
    vec![vec![" a ", " b "]],
    |b| {
        b.trim_whitespace(false);
    }
);
parses_to!(
    quoted_spaces_kept,
    "\" a \" , b",
    vec![vec![" a ", "b"]]
);

parses_to!(
    custom_delimiter,
    "a;b\nc;d",
    vec![vec!["a", "b"], vec!["c", "d"]],
    |b| {
        b.delimiter(';');
    }
);
parses_to!(
    custom_terminator,
    "a,b|c\nd|",
    vec![vec!["a", "b"], vec!["c\nd"]],
    |b| {
        b.terminator(Terminator::Any('|'));
    }
);

parses_to!(
    comments,
    "#x,y\na,b\n#z\nc",
    vec![vec!["a", "b"], vec!["c"]],
    |b| {
        b.comment(Some('#'));
    }
);
parses_to!(
    comment_only_at_record_start,
    "a,#b\n",
    vec![vec!["a", "#b"]],
    |b| {
        b.comment(Some('#'));
    }
);
parses_to!(comments_disabled, "#a,b", vec![vec!["#a", "b"]]);

parses_to!(
    backslash_escaped_delimiter,
    "a,b\\,c,d",
    vec![vec!["a", "b,c", "d"]],
    |b| {
        b.escape_mode(EscapeMode::Backslash);
    }
);
parses_to!(
    backslash_escaped_qualifier,
    "\"a\\\"b\",c",
    vec![vec!["a\"b", "c"]],
    |b| {
        b.escape_mode(EscapeMode::Backslash);
    }
);
parses_to!(
    backslash_mnemonics,
    "\\n,a\\tb",
    vec![vec!["\n", "a\tb"]],
    |b| {
        b.escape_mode(EscapeMode::Backslash);
    }
);
parses_to!(
    backslash_literals,
    "\\x41\\101\\u00e9\\d066",
    vec![vec!["AAéB"]],
    |b| {
        b.escape_mode(EscapeMode::Backslash);
    }
);
parses_to!(
    backslash_literal_ends_early,
    "\\x4g,\\7",
    vec![vec!["\u{4}g", "\u{7}"]],
    |b| {
        b.escape_mode(EscapeMode::Backslash);
    }
);
parses_to!(
    backslash_at_end_of_data,
    "a\\",
    vec![vec!["a"]],
    |b| {
        b.escape_mode(EscapeMode::Backslash);
    }
);
parses_to!(
    backslash_is_data_by_default,
    "a\\,b",
    vec![vec!["a\\", "b"]]
);

#[test]
fn qualified_flags() {
    let mut rdr = Reader::from_text("a,\"b\",\"\"\n");
    assert!(rdr.read_record().unwrap());
    assert_eq!(rdr.is_qualified(0), Some(false));
    assert_eq!(rdr.is_qualified(1), Some(true));
    assert_eq!(rdr.is_qualified(2), Some(true));
    assert_eq!(rdr.is_qualified(3), None);
    assert_eq!(rdr.column_count(), 3);
}

#[test]
fn long_column_trips_safety_switch() {
    let data = format!("a\nb\n{}\n", "x".repeat(Limit::ColumnLength.max() + 1));
    let mut rdr = Reader::from_text(data.clone());
    assert!(rdr.read_record().unwrap());
    assert!(rdr.read_record().unwrap());
    match rdr.read_record() {
        Err(Error::LimitExceeded { limit, record, column }) => {
            assert_eq!(limit, Limit::ColumnLength);
            assert_eq!(record, 2);
            assert_eq!(column, 0);
        }
        other => panic!("expected a limit error, got {:?}", other),
    }
    assert!(rdr.is_closed());
    assert!(rdr.read_record().unwrap_err().is_closed());

    let mut rdr = ReaderBuilder::new()
        .safety_switch(false)
        .from_text(data)
        .unwrap();
    let rows = collect(&mut rdr);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][0].len(), Limit::ColumnLength.max() + 1);
}

#[test]
fn column_length_at_limit() {
    let data = "y".repeat(Limit::ColumnLength.max());
    let mut rdr = Reader::from_text(data);
    assert!(rdr.read_record().unwrap());
    assert_eq!(rdr.get(0).map(|v| v.len()), Some(Limit::ColumnLength.max()));
}

#[test]
fn unterminated_quote_trips_safety_switch() {
    let data = format!("\"{}", "z\n".repeat(Limit::ColumnLength.max()));
    let mut rdr = ReaderBuilder::new()
        .buffer_capacity(4096)
        .from_text(data)
        .unwrap();
    let err = rdr.read_record().unwrap_err();
    assert!(err.is_limit());
    assert!(rdr.is_closed());
}

#[test]
fn too_many_columns_trips_safety_switch() {
    let max = Limit::Columns.max();
    let mut rdr = Reader::from_text(",".repeat(max - 1));
    assert!(rdr.read_record().unwrap());
    assert_eq!(rdr.column_count(), max);

    let mut rdr = Reader::from_text(",".repeat(max));
    match rdr.read_record() {
        Err(Error::LimitExceeded { limit, record, column }) => {
            assert_eq!(limit, Limit::Columns);
            assert_eq!(record, 0);
            assert_eq!(column, max);
        }
        other => panic!("expected a limit error, got {:?}", other),
    }
}

#[test]
fn headers_by_name() {
    let mut rdr = Reader::from_text("Name,Age\nann,41\n");
    assert!(rdr.read_headers().unwrap());
    assert_eq!(rdr.headers(), &["Name", "Age"]);
    assert_eq!(rdr.header(1), Some("Age"));
    assert_eq!(rdr.header_count(), 2);
    assert_eq!(rdr.current_record(), None);

    assert!(rdr.read_record().unwrap());
    assert_eq!(rdr.current_record(), Some(0));
    assert_eq!(rdr.get_by_name("Age"), Some("41"));
    assert_eq!(rdr.get_by_name("age"), None);

    rdr.set_case_sensitive(false);
    assert_eq!(rdr.get_by_name("age"), Some("41"));
    assert_eq!(rdr.index_of("NAME"), Some(0));
    assert!(!rdr.settings().case_sensitive_headers());

    rdr.set_headers(vec!["x", "y"]);
    assert_eq!(rdr.get_by_name("Y"), Some("41"));
    assert_eq!(rdr.get_by_name("Name"), None);
}

#[test]
fn case_insensitive_headers_from_builder() {
    let mut rdr = ReaderBuilder::new()
        .case_sensitive_headers(false)
        .from_text("ID,id\n1,2\n")
        .unwrap();
    rdr.read_headers().unwrap();
    rdr.read_record().unwrap();
    assert_eq!(rdr.get_by_name("Id"), Some("2"));
}

#[test]
fn skipping_keeps_ordinals() {
    let mut rdr = Reader::from_text("junk \"line\nh\na\nb\nc\n");
    assert!(rdr.skip_line().unwrap());
    assert!(rdr.read_headers().unwrap());
    assert_eq!(rdr.headers(), &["h"]);

    assert!(rdr.read_record().unwrap());
    assert_eq!(rdr.get(0), Some("a"));
    assert_eq!(rdr.current_record(), Some(0));

    assert!(rdr.skip_record().unwrap());
    assert!(rdr.read_record().unwrap());
    assert_eq!(rdr.get(0), Some("c"));
    assert_eq!(rdr.current_record(), Some(1));
    assert_eq!(rdr.record().position(), Some(1));

    assert!(!rdr.skip_record().unwrap());
    assert!(!rdr.skip_line().unwrap());
    assert!(!rdr.read_record().unwrap());
}

#[test]
fn records_iterator() {
    let mut rdr = Reader::from_text("a,b\nc,d\n");
    let records = rdr.records().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1], vec!["c", "d"]);
    assert_eq!(records[0].position(), Some(0));
    assert_eq!(records[1].position(), Some(1));
}

#[test]
fn use_after_close() {
    let mut rdr = Reader::from_text("a,b\nc,d\n");
    assert!(rdr.read_headers().unwrap());
    assert!(rdr.read_record().unwrap());
    rdr.close();
    rdr.close();
    assert!(rdr.is_closed());
    assert_eq!(rdr.get(0), None);
    assert!(rdr.values().is_empty());
    assert!(rdr.headers().is_empty());
    assert!(rdr.read_record().unwrap_err().is_closed());
    assert!(rdr.skip_line().unwrap_err().is_closed());
    assert!(rdr.records().next().unwrap().unwrap_err().is_closed());
}

#[test]
fn invalid_configuration() {
    let err = ReaderBuilder::new().delimiter('"').from_text("").unwrap_err();
    match err {
        Error::InvalidArgument(_) => {}
        other => panic!("expected an invalid argument, got {:?}", other),
    }
    assert!(ReaderBuilder::new()
        .delimiter('"')
        .use_text_qualifier(false)
        .from_text("")
        .is_ok());
    assert!(ReaderBuilder::new().delimiter('\n').from_text("").is_err());
    assert!(ReaderBuilder::new().buffer_capacity(0).from_text("").is_err());
    assert!(ReaderBuilder::new()
        .comment(Some(','))
        .from_text("")
        .is_err());
}

#[test]
fn raw_records_across_capacities() {
    let data = "a,\"b\r\nc\"\r\n#x\r\n\r\n  d ,e\nlast";
    let expected = vec![
        (vec!["a", "b\r\nc"], "a,\"b\r\nc\""),
        (vec!["d", "e"], "  d ,e"),
        (vec!["last"], "last"),
    ];
    for cap in 1..data.len() + 2 {
        let mut rdr = ReaderBuilder::new()
            .comment(Some('#'))
            .buffer_capacity(cap)
            .from_text(data)
            .unwrap();
        for &(ref values, raw) in &expected {
            assert!(rdr.read_record().unwrap(), "capacity {}", cap);
            assert!(rdr.check_invariants());
            assert_eq!(rdr.values(), &values[..], "capacity {}", cap);
            assert_eq!(rdr.raw_record(), raw, "capacity {}", cap);
        }
        assert!(!rdr.read_record().unwrap());
        assert_eq!(rdr.raw_record(), "");
    }
}

#[test]
fn raw_capture_disabled() {
    let mut rdr = ReaderBuilder::new()
        .capture_raw_record(false)
        .from_text("a,b\n")
        .unwrap();
    assert!(rdr.read_record().unwrap());
    assert_eq!(rdr.raw_record(), "");
}
