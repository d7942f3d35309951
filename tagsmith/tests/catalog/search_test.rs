use crate::common::fixtures::fixture_catalog;

#[test]
fn blank_query_returns_everything() {
    let catalog = fixture_catalog();
    assert_eq!(catalog.search("  ").len(), catalog.len());
}

#[test]
fn ranked_by_match_quality() {
    let catalog = fixture_catalog();
    let hits: Vec<&str> = catalog.search("mario").iter().map(|r| r.display_name()).collect();
    // the "Super Mario" series hit is the same record and is not repeated
    assert_eq!(hits, ["Mario"]);

    let hits: Vec<&str> = catalog.search("SPYRO").iter().map(|r| r.display_name()).collect();
    // Spyro exact, then both figures of "Skylanders Spyro's Adventure" by word start
    assert_eq!(hits, ["Spyro", "Gill Grunt"]);
}

#[test]
fn substring_hits_come_last() {
    let catalog = fixture_catalog();
    let hits: Vec<&str> = catalog.search("ink").iter().map(|r| r.display_name()).collect();
    assert_eq!(hits, ["Link"]);
}

#[test]
fn no_match_is_empty() {
    assert!(fixture_catalog().search("bowser").is_empty());
}

#[test]
fn grouped_by_series() {
    let catalog = fixture_catalog();
    let groups = catalog.by_series();
    assert_eq!(catalog.series_count(), 3);
    assert_eq!(groups["Skylanders Spyro's Adventure"].len(), 2);
    assert_eq!(groups["The Legend of Zelda"][0].display_name(), "Link");
}
