// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests {
    use crate::capture::{CapturedRequest, CapturedResponse};
    use crate::core::{HttpHeaders, HttpMessage, HttpRequest, HttpResponse, Origin};
    use crate::filters::{
        BodyTruncation, HeaderObfuscation, HeaderPolicy, HeaderStrategy, PathObfuscation,
        RequestFilter, ResponseFilter, DEFAULT_REQUEST_HEADERS, DEFAULT_RESPONSE_HEADERS,
    };
    use bytes::Bytes;

    // Helper function to create a representative header set
    fn create_test_headers() -> HttpHeaders {
        HttpHeaders::new()
            .with("Accept", "application/json")
            .with("Content-Type", "application/json")
            .with("X-Secret", "abc")
            .with("x-gravitee-api-key", "key-1")
            .with("X-Request-Id", "r-1")
    }

    fn names(headers: &HttpHeaders) -> Vec<&str> {
        headers.names().collect()
    }

    const NO_LIST: &[&str] = &[];

    #[test]
    fn test_strategy_all_passes_through() {
        let headers = create_test_headers();
        let filtered = HeaderStrategy::All.filter(&headers, DEFAULT_REQUEST_HEADERS, NO_LIST);
        assert_eq!(filtered, headers);
    }

    #[test]
    fn test_strategy_none_drops_everything() {
        let headers = create_test_headers();
        let filtered =
            HeaderStrategy::None.filter(&headers, DEFAULT_REQUEST_HEADERS, &["X-Secret"]);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_strategy_default_keeps_default_list_case_insensitively() {
        let headers = create_test_headers();
        let filtered =
            HeaderStrategy::Default.filter(&headers, DEFAULT_REQUEST_HEADERS, &["X-Request-Id"]);
        assert_eq!(
            names(&filtered),
            vec!["Accept", "Content-Type", "x-gravitee-api-key"]
        );
    }

    #[test]
    fn test_strategy_default_on_responses() {
        let headers = create_test_headers();
        let filtered = HeaderStrategy::Default.filter(&headers, DEFAULT_RESPONSE_HEADERS, NO_LIST);
        assert_eq!(names(&filtered), vec!["Content-Type"]);
    }

    #[test]
    fn test_strategy_custom_keeps_custom_list_only() {
        let headers = create_test_headers();
        let filtered = HeaderStrategy::Custom.filter(
            &headers,
            DEFAULT_REQUEST_HEADERS,
            &["x-request-id".to_string()],
        );
        assert_eq!(names(&filtered), vec!["X-Request-Id"]);
        assert_eq!(filtered.first("x-request-id"), Some("r-1"));
    }

    #[test]
    fn test_strategy_custom_with_empty_list_is_empty() {
        let headers = create_test_headers();
        let filtered = HeaderStrategy::Custom.filter(&headers, DEFAULT_REQUEST_HEADERS, NO_LIST);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_strategy_default_with_empty_list_is_empty() {
        let headers = create_test_headers();
        let filtered = HeaderStrategy::Default.filter(&headers, NO_LIST, &["Accept"]);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_strategy_default_and_custom_keeps_union() {
        let headers = create_test_headers();
        let filtered = HeaderStrategy::DefaultAndCustom.filter(
            &headers,
            DEFAULT_RESPONSE_HEADERS,
            &["X-SECRET"],
        );
        assert_eq!(names(&filtered), vec!["Content-Type", "X-Secret"]);
    }

    #[test]
    fn test_strategy_default_and_custom_both_empty() {
        let headers = create_test_headers();
        let filtered = HeaderStrategy::DefaultAndCustom.filter(&headers, NO_LIST, NO_LIST);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filtered_headers_are_a_subset() {
        let headers = create_test_headers();
        for strategy in [
            HeaderStrategy::All,
            HeaderStrategy::None,
            HeaderStrategy::Default,
            HeaderStrategy::Custom,
            HeaderStrategy::DefaultAndCustom,
        ] {
            let filtered = strategy.filter(&headers, DEFAULT_REQUEST_HEADERS, &["X-Request-Id"]);
            for (name, values) in filtered.iter() {
                assert_eq!(headers.get(name), Some(values), "{strategy} invented {name}");
            }
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("ALL".parse::<HeaderStrategy>().unwrap(), HeaderStrategy::All);
        assert_eq!("none".parse::<HeaderStrategy>().unwrap(), HeaderStrategy::None);
        assert_eq!(" Default ".parse::<HeaderStrategy>().unwrap(), HeaderStrategy::Default);
        assert_eq!(
            "default-and-custom".parse::<HeaderStrategy>().unwrap(),
            HeaderStrategy::DefaultAndCustom
        );
        assert!("SOME".parse::<HeaderStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: HeaderStrategy = serde_json::from_str("\"custom\"").unwrap();
        assert_eq!(strategy, HeaderStrategy::Custom);
        assert_eq!(
            serde_json::to_string(&HeaderStrategy::DefaultAndCustom).unwrap(),
            "\"DEFAULT_AND_CUSTOM\""
        );
        assert!(serde_json::from_str::<HeaderStrategy>("\"bogus\"").is_err());
    }

    #[test]
    fn test_header_policy_uses_direction_defaults() {
        let headers = create_test_headers();
        let request = HeaderPolicy::for_requests(HeaderStrategy::Default, vec![]);
        let response = HeaderPolicy::for_responses(HeaderStrategy::Default, vec![]);

        assert_eq!(request.apply(&headers).len(), 3);
        assert_eq!(response.apply(&headers).len(), 1);
        assert_eq!(request.strategy(), HeaderStrategy::Default);
    }

    #[test]
    fn test_header_obfuscation() {
        let mut headers = create_test_headers().with("x-secret", "def");
        HeaderObfuscation::new(vec!["X-SECRET".to_string()]).apply(&mut headers);

        assert_eq!(
            headers.get("X-Secret").unwrap(),
            &["XXX".to_string(), "XXX".to_string()]
        );
        assert_eq!(headers.first("Accept"), Some("application/json"));
    }

    #[test]
    fn test_header_obfuscation_empty_is_noop() {
        let mut headers = create_test_headers();
        let obfuscation = HeaderObfuscation::default();
        obfuscation.apply(&mut headers);

        assert!(obfuscation.is_empty());
        assert_eq!(headers, create_test_headers());
    }

    #[test]
    fn test_path_obfuscation_placeholder() {
        let paths = PathObfuscation::new(["/accounts/{id}/cards/{card}"]);
        assert_eq!(paths.apply("/accounts/42/cards/7"), "/accounts/XXX/cards/XXX");
    }

    #[test]
    fn test_path_obfuscation_keeps_query_and_authority() {
        let paths = PathObfuscation::new(["/users/{id}"]);
        assert_eq!(
            paths.apply("https://api.example.com:8443/users/alice?expand=true#top"),
            "https://api.example.com:8443/users/XXX?expand=true#top"
        );
    }

    #[test]
    fn test_path_obfuscation_wildcard_keeps_segment() {
        let paths = PathObfuscation::new(["/*/tokens/{token}"]);
        assert_eq!(paths.apply("/v1/tokens/abc"), "/v1/tokens/XXX");
    }

    #[test]
    fn test_path_obfuscation_no_match_borrows() {
        let paths = PathObfuscation::new(["/users/{id}"]);
        let uri = "/users/alice/orders";
        assert!(matches!(paths.apply(uri), std::borrow::Cow::Borrowed(_)));
        assert_eq!(paths.apply("/orders/1"), "/orders/1");
        assert_eq!(paths.apply("http://host"), "http://host");
    }

    #[test]
    fn test_path_obfuscation_first_match_wins() {
        let paths = PathObfuscation::new(["/users/me", "/users/{id}"]);
        assert_eq!(paths.apply("/users/me"), "/users/me");
        assert_eq!(paths.apply("/users/bob"), "/users/XXX");
    }

    #[test]
    fn test_body_truncation() {
        let truncation = BodyTruncation::new(5);
        assert_eq!(truncation.apply(Bytes::from_static(b"abc")), Bytes::from_static(b"abc"));
        assert_eq!(truncation.apply(Bytes::from_static(b"abcde")), Bytes::from_static(b"abcde"));
        assert_eq!(
            truncation.apply(Bytes::from_static(b"abcdefgh")),
            Bytes::from_static(b"abcde...")
        );
    }

    #[test]
    fn test_body_truncation_respects_char_boundaries() {
        let truncation = BodyTruncation::new(2);
        let body = Bytes::from("héllo");
        assert_eq!(truncation.apply(body), Bytes::from("hé..."));
    }

    #[test]
    fn test_body_truncation_negative_is_unlimited() {
        let truncation = BodyTruncation::new(-1);
        assert_eq!(truncation.max_chars(), None);
        let body = Bytes::from("x".repeat(10_000));
        assert_eq!(truncation.apply(body.clone()), body);
    }

    #[test]
    fn test_request_filter_wraps_without_mutating() {
        let request = CapturedRequest::new(Origin::Remote, "GET", "/users/alice?x=1")
            .with_header("Accept", "application/json")
            .with_header("Authorization", "Bearer t")
            .with_header("X-Other", "1")
            .with_body("0123456789");

        let filter = RequestFilter {
            headers: HeaderPolicy::for_requests(
                HeaderStrategy::DefaultAndCustom,
                vec!["authorization".to_string()],
            ),
            obfuscation: HeaderObfuscation::new(vec!["Authorization".to_string()]),
            paths: PathObfuscation::new(["/users/{id}"]),
            body: BodyTruncation::new(4),
        };

        let filtered = filter.apply(&request);

        assert_eq!(filtered.method(), "GET");
        assert_eq!(filtered.origin(), Origin::Remote);
        assert_eq!(filtered.request_uri(), "/users/XXX?x=1");
        assert_eq!(names(filtered.headers()), vec!["Accept", "Authorization"]);
        assert_eq!(filtered.headers().first("authorization"), Some("XXX"));
        assert_eq!(filtered.body().unwrap(), Bytes::from_static(b"0123..."));

        // The original view is untouched.
        let original = filtered.original();
        assert_eq!(original.request_uri(), "/users/alice?x=1");
        assert_eq!(original.headers().first("Authorization"), Some("Bearer t"));
        assert_eq!(original.headers().len(), 3);
    }

    #[test]
    fn test_filtered_view_keeps_content_type_when_header_dropped() {
        let request = CapturedRequest::new(Origin::Local, "POST", "/")
            .with_header("Content-Type", "application/json");
        let filter = RequestFilter {
            headers: HeaderPolicy::for_requests(HeaderStrategy::None, vec![]),
            ..RequestFilter::default()
        };

        let filtered = filter.apply(&request);
        assert!(filtered.headers().is_empty());
        assert_eq!(filtered.content_type(), Some("application/json"));
    }

    #[test]
    fn test_response_filter() {
        let response = CapturedResponse::new(Origin::Local, 201)
            .with_header("Content-Type", "text/plain")
            .with_header("Set-Cookie", "s=1")
            .with_body("created");

        let filter = ResponseFilter {
            headers: HeaderPolicy::for_responses(HeaderStrategy::Default, vec![]),
            ..ResponseFilter::default()
        };
        let filtered = filter.apply(&response);

        assert_eq!(filtered.status(), 201);
        assert_eq!(names(filtered.headers()), vec!["Content-Type"]);
        assert_eq!(filtered.body_as_string().unwrap(), "created");
        assert_eq!(filtered.original().headers().len(), 2);
    }

    #[test]
    fn test_filters_work_through_trait_objects() {
        let request = CapturedRequest::new(Origin::Local, "GET", "/");
        let view: &dyn HttpRequest = &request;
        let filtered = RequestFilter::default().apply(view);
        assert_eq!(filtered.request_uri(), "/");
    }
}
