use promocrawl::{CrawlConfig, CrawlError};

#[test]
fn builder_applies_documented_defaults() {
    let config = CrawlConfig::builder("laser toning").build().unwrap();
    assert_eq!(config.keyword(), "laser toning");
    assert_eq!(config.base_url(), "https://www.yeoshin.co.kr");
    assert_eq!(config.max_items(), 50);
    assert_eq!(config.workers(), 1);
    assert!(config.headless());
    assert_eq!(config.page_load_timeout_secs(), 30);
    assert_eq!(config.scroll_rounds(), 5);
}

#[test]
fn keyword_is_trimmed_and_required() {
    let config = CrawlConfig::builder("  botox  ").build().unwrap();
    assert_eq!(config.keyword(), "botox");

    let err = CrawlConfig::builder("   ").build().unwrap_err();
    assert!(matches!(err, CrawlError::Config(_)));
}

#[test]
fn zero_items_or_workers_is_rejected() {
    assert!(matches!(
        CrawlConfig::builder("botox").max_items(0).build(),
        Err(CrawlError::Config(_))
    ));
    assert!(matches!(
        CrawlConfig::builder("botox").workers(0).build(),
        Err(CrawlError::Config(_))
    ));
}

#[test]
fn invalid_base_url_is_rejected_at_build_time() {
    assert!(matches!(
        CrawlConfig::builder("botox").base_url("not a url").build(),
        Err(CrawlError::Config(_))
    ));
    // parses, but has no host to scope cookies to
    assert!(matches!(
        CrawlConfig::builder("botox").base_url("data:text/plain,x").build(),
        Err(CrawlError::Config(_))
    ));
}

#[test]
fn search_url_carries_keyword_and_events_tab() {
    let config = CrawlConfig::builder("눈밑지방").build().unwrap();
    let url = config.search_url().unwrap();
    assert_eq!(url.path(), "/search/category");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("q".to_string(), "눈밑지방".to_string())));
    assert!(pairs.contains(&("tab".to_string(), "events".to_string())));
}

#[test]
fn my_page_url_targets_the_authenticated_view() {
    let config = CrawlConfig::builder("botox").build().unwrap();
    assert_eq!(config.my_page_url().unwrap().path(), "/myPage");
}

#[test]
fn cookie_domain_spans_subdomains() {
    let config = CrawlConfig::builder("botox").build().unwrap();
    assert_eq!(config.cookie_domain().unwrap(), ".yeoshin.co.kr");

    let config = CrawlConfig::builder("botox")
        .base_url("https://staging.example.com")
        .build()
        .unwrap();
    assert_eq!(config.cookie_domain().unwrap(), ".staging.example.com");
}

#[test]
fn base_url_override_flows_into_derived_urls() {
    let config = CrawlConfig::builder("botox")
        .base_url("https://www.mirror.test")
        .build()
        .unwrap();
    let url = config.search_url().unwrap();
    assert_eq!(url.host_str(), Some("www.mirror.test"));
}
