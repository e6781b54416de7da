// End-to-end formatting tests

use urlfmt::{format, try_format, FormatError, QuerySet, Value};

#[test]
fn test_simple_path_placeholder() {
    assert_eq!(
        format("http://example.com/{}", &[1000.into()]),
        "http://example.com/1000"
    );
}

#[test]
fn test_protocol_placeholder() {
    assert_eq!(
        format("{}://bucket.example.com/file/path", &["s3".into()]),
        "s3://bucket.example.com/file/path"
    );
}

#[test]
fn test_protocol_placeholder_optional_string() {
    assert_eq!(
        format("{}://bucket.example.com/file/path", &[Some("s3").into()]),
        "s3://bucket.example.com/file/path"
    );
}

#[test]
fn test_protocol_relative_static() {
    assert_eq!(
        format("//bucket.example.com/file/path", &[]),
        "//bucket.example.com/file/path"
    );
}

#[test]
fn test_protocol_relative_from_null() {
    assert_eq!(
        format("{}://bucket.example.com/file/path", &[Value::null()]),
        "//bucket.example.com/file/path"
    );
}

#[test]
fn test_hostname_placeholder() {
    assert_eq!(
        format("http://{}/to/resource/path", &["api.example.com".into()]),
        "http://api.example.com/to/resource/path"
    );
}

#[test]
fn test_hostname_placeholder_optional_string() {
    assert_eq!(
        format(
            "http://{}/to/resource/path",
            &[Some("api.example.com".to_string()).into()],
        ),
        "http://api.example.com/to/resource/path"
    );
}

#[test]
fn test_path_only_template() {
    assert_eq!(format("/to/resource/path", &[]), "/to/resource/path");
}

#[test]
fn test_null_hostname_drops_scheme_too() {
    assert_eq!(
        format("http://{}/to/resource/path", &[Value::null()]),
        "/to/resource/path"
    );
}

#[test]
fn test_port_placeholder() {
    assert_eq!(
        format("http://api.example.com:{}/to/resource/path", &[1000.into()]),
        "http://api.example.com:1000/to/resource/path"
    );
}

#[test]
fn test_port_placeholder_optional_integer() {
    assert_eq!(
        format(
            "http://api.example.com:{}/to/resource/path",
            &[Some(1000).into()],
        ),
        "http://api.example.com:1000/to/resource/path"
    );
}

#[test]
fn test_null_port_is_omitted() {
    assert_eq!(
        format("http://api.example.com:{}/to/resource/path", &[Value::null()]),
        "http://api.example.com/to/resource/path"
    );
}

#[test]
fn test_path_placeholder_string() {
    assert_eq!(
        format("http://api.example.com/users/{}/", &["bob".into()]),
        "http://api.example.com/users/bob/"
    );
}

#[test]
fn test_path_placeholder_integer() {
    assert_eq!(
        format("http://api.example.com/users/{}/", &[1000.into()]),
        "http://api.example.com/users/1000/"
    );
}

#[test]
fn test_path_placeholder_null_is_omitted() {
    assert_eq!(
        format("http://api.example.com/users/{}/", &[Value::null()]),
        "http://api.example.com/users/"
    );
}

#[test]
fn test_path_placeholder_list() {
    let list = vec!["a".into(), "b".into(), 1000.into()];
    assert_eq!(
        format("http://api.example.com/users/{}/", &[list.into()]),
        "http://api.example.com/users/a/b/1000/"
    );
}

#[test]
fn test_path_placeholder_list_skips_nulls() {
    let list = vec![Value::null(), "b".into(), Value::null()];
    assert_eq!(
        format("http://api.example.com/users/{}/", &[list.into()]),
        "http://api.example.com/users/b/"
    );
}

#[test]
fn test_path_placeholder_empty_list() {
    assert_eq!(
        format("http://api.example.com/users/{}/", &[Vec::new().into()]),
        "http://api.example.com/users/"
    );
}

#[test]
fn test_path_placeholder_string_is_a_subpath() {
    assert_eq!(
        format("http://api.example.com/users/{}/", &["a/b/1000".into()]),
        "http://api.example.com/users/a/b/1000/"
    );
}

#[test]
fn test_path_placeholder_subpath_components_are_escaped() {
    assert_eq!(
        format("http://api.example.com/users/{}/", &["a/b/🐙".into()]),
        "http://api.example.com/users/a/b/%F0%9F%90%99/"
    );
}

#[test]
fn test_path_list_elements_are_opaque_segments() {
    // An embedded '/' in a list element stays inside its segment
    let list = vec!["a/b".into()];
    assert_eq!(
        format("http://api.example.com/users/{}/", &[list.into()]),
        "http://api.example.com/users/a%2Fb/"
    );
}

#[test]
fn test_static_query() {
    assert_eq!(
        format("http://api.example.com/users/?key=value", &[]),
        "http://api.example.com/users/?key=value"
    );
}

#[test]
fn test_static_query_repeated_keys() {
    assert_eq!(
        format("http://api.example.com/users/?key=value&key=value2", &[]),
        "http://api.example.com/users/?key=value&key=value2"
    );
}

#[test]
fn test_query_placeholder_string() {
    assert_eq!(
        format("http://api.example.com/users/?key={}", &["str-value".into()]),
        "http://api.example.com/users/?key=str-value"
    );
}

#[test]
fn test_query_placeholder_value_is_encoded() {
    assert_eq!(
        format("http://api.example.com/users/?key={}", &["a b&c".into()]),
        "http://api.example.com/users/?key=a+b%26c"
    );
}

#[test]
fn test_query_placeholder_null_removes_key() {
    assert_eq!(
        format("http://api.example.com/users/?key={}", &[Value::null()]),
        "http://api.example.com/users/"
    );
}

#[test]
fn test_query_placeholder_null_removes_static_entries_of_key() {
    assert_eq!(
        format("http://api.example.com/users/?key=old&key={}", &[Value::null()]),
        "http://api.example.com/users/"
    );
}

#[test]
fn test_query_placeholder_list_overwrites_then_appends() {
    let list = vec!["a".into(), "b".into(), "c".into()];
    assert_eq!(
        format("http://api.example.com/users/?key=old&key={}", &[list.into()]),
        "http://api.example.com/users/?key=a&key=b&key=c"
    );
}

#[test]
fn test_query_set_merge() {
    let set = QuerySet::parse("key=a&key=b&key=c&key2=value");
    assert_eq!(
        format("http://api.example.com/users/?key=old&{}", &[set.into()]),
        "http://api.example.com/users/?key=a&key=b&key=c&key2=value"
    );
}

#[test]
fn test_query_order_is_first_occurrence() {
    assert_eq!(
        format("/search?b=2&a=1&b={}", &["3".into()]),
        "/search?b=2&b=3&a=1"
    );
}

#[test]
fn test_static_fragment() {
    assert_eq!(
        format("http://api.example.com/users/#hash", &[]),
        "http://api.example.com/users/#hash"
    );
}

#[test]
fn test_fragment_placeholder() {
    assert_eq!(
        format("http://api.example.com/users/#{}", &["hash".into()]),
        "http://api.example.com/users/#hash"
    );
}

#[test]
fn test_fragment_placeholder_optional_string() {
    assert_eq!(
        format("http://api.example.com/users/#{}", &[Some("hash").into()]),
        "http://api.example.com/users/#hash"
    );
}

#[test]
fn test_fragment_placeholder_null_is_omitted() {
    assert_eq!(
        format("http://api.example.com/users/#{}", &[Value::null()]),
        "http://api.example.com/users/"
    );
}

#[test]
fn test_static_template_is_idempotent() {
    let template = "http://example.com:8080/path?q=1#frag";
    assert_eq!(format(template, &[]), format(template, &[]));
    assert_eq!(format(template, &[]), template);
}

#[test]
fn test_try_format_missing_argument() {
    let err = try_format("http://example.com/{}/{}", &["a".into()]).unwrap_err();
    assert!(matches!(err, FormatError::Binding(_)));
    assert!(err.to_string().contains("{1}"));
}

#[test]
fn test_try_format_wrong_type_for_protocol() {
    let err = try_format("{}://example.com", &[1000.into()]).unwrap_err();
    assert!(matches!(err, FormatError::Binding(_)));
    assert!(err.to_string().contains("protocol"));
}

#[test]
fn test_try_format_wrong_type_for_port() {
    let err = try_format("http://example.com:{}/x", &["eighty".into()]).unwrap_err();
    assert!(matches!(err, FormatError::Binding(_)));
    assert!(err.to_string().contains("port"));
}

#[test]
fn test_try_format_dynamic_port_out_of_range() {
    let err = try_format("http://example.com:{}/x", &[0.into()]).unwrap_err();
    assert!(err.to_string().contains("range 1-65535"));
    let err = try_format("http://example.com:{}/x", &[65536.into()]).unwrap_err();
    assert!(err.to_string().contains("range 1-65535"));
    assert_eq!(
        try_format("http://example.com:{}/x", &[65535.into()]).unwrap(),
        "http://example.com:65535/x"
    );
}

#[test]
fn test_try_format_query_set_requires_query_value() {
    let err = try_format("/users?{}", &["plain".into()]).unwrap_err();
    assert!(matches!(err, FormatError::Binding(_)));
    assert!(err.to_string().contains("query set"));
}

#[test]
fn test_try_format_query_set_not_valid_for_path() {
    let err = try_format("/users/{}", &[QuerySet::new().into()]).unwrap_err();
    assert!(matches!(err, FormatError::Binding(_)));
}

#[test]
fn test_try_format_syntax_error() {
    let err = try_format("://example.com", &[]).unwrap_err();
    assert!(matches!(err, FormatError::Syntax(_)));
}

#[test]
fn test_try_format_static_port_range() {
    assert!(try_format("//example.com:1", &[]).is_ok());
    assert!(try_format("//example.com:65535", &[]).is_ok());
    assert!(try_format("//example.com:0", &[]).is_err());
    assert!(try_format("//example.com:65536", &[]).is_err());
}

#[test]
#[should_panic(expected = "template syntax error")]
fn test_format_panics_on_syntax_error() {
    format("://example.com", &[]);
}

#[test]
fn test_extra_arguments_are_ignored() {
    assert_eq!(
        format("/users/{}", &["bob".into(), "unused".into()]),
        "/users/bob"
    );
}
