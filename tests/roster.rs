mod common;

use mlbb_terminal::api::{ROSTER_PAGE_SIZE, hero_position_path};
use mlbb_terminal::roster::{
    ALL_LANES, ROLE_FILTERS, Role, RoleFilter, RosterPages, aggregate_all, aggregate_role,
};

use common::{MockApi, position_page};

fn page_path(role: Role, page: usize) -> String {
    hero_position_path(role.api_key(), ALL_LANES, ROSTER_PAGE_SIZE, page)
}

#[test]
fn short_page_ends_pagination() {
    let api = MockApi::new();
    api.serve(page_path(Role::Tank, 1), position_page("t", 0, 50))
        .serve(page_path(Role::Tank, 2), position_page("t", 50, 50))
        .serve(page_path(Role::Tank, 3), position_page("t", 100, 7));

    let heroes = aggregate_role(&api, RoleFilter::new(Role::Tank, ALL_LANES))
        .expect("roster should aggregate");
    assert_eq!(heroes.len(), 107);
    assert_eq!(heroes[0].name, "t0");
    assert_eq!(heroes[106].name, "t106");
    assert_eq!(heroes[106].image_url, "https://img/t106.png");
    assert_eq!(api.request_count("/api/hero-position/?role=tank"), 3);
}

#[test]
fn empty_page_ends_pagination() {
    let api = MockApi::new();
    api.serve(page_path(Role::Mage, 1), position_page("m", 0, 50))
        .serve(page_path(Role::Mage, 2), position_page("m", 50, 0));

    let heroes = aggregate_role(&api, RoleFilter::new(Role::Mage, ALL_LANES))
        .expect("roster should aggregate");
    assert_eq!(heroes.len(), 50);
    assert_eq!(api.request_count("/api/hero-position/"), 2);
}

#[test]
fn missing_records_stops_immediately() {
    let api = MockApi::new();
    api.serve(page_path(Role::Support, 1), r#"{"code":0,"data":{}}"#);

    let heroes = aggregate_role(&api, RoleFilter::new(Role::Support, ALL_LANES))
        .expect("missing records is not an error");
    assert!(heroes.is_empty());
    assert_eq!(api.request_count("/api/hero-position/"), 1);
}

#[test]
fn pages_are_fetched_lazily() {
    let api = MockApi::new();
    api.serve(page_path(Role::Fighter, 1), position_page("f", 0, 50))
        .serve(page_path(Role::Fighter, 2), position_page("f", 50, 3));

    let mut pages = RosterPages::new(&api, RoleFilter::new(Role::Fighter, ALL_LANES));
    assert_eq!(api.request_count("/api/hero-position/"), 0);

    let first = pages.next().expect("first page").expect("first page ok");
    assert_eq!(first.len(), 50);
    assert_eq!(api.request_count("/api/hero-position/"), 1);

    let second = pages.next().expect("second page").expect("second page ok");
    assert_eq!(second.len(), 3);
    assert!(pages.next().is_none());
    assert_eq!(api.request_count("/api/hero-position/"), 2);
}

#[test]
fn total_equals_sum_of_full_pages_and_the_short_one() {
    for (full_pages, tail) in [(0usize, 0usize), (0, 12), (1, 0), (2, 49), (4, 1)] {
        let api = MockApi::new();
        for page in 0..full_pages {
            api.serve(
                page_path(Role::Marksman, page + 1),
                position_page("mm", page * 50, 50),
            );
        }
        api.serve(
            page_path(Role::Marksman, full_pages + 1),
            position_page("mm", full_pages * 50, tail),
        );

        let heroes = aggregate_role(&api, RoleFilter::new(Role::Marksman, ALL_LANES))
            .expect("roster should aggregate");
        assert_eq!(heroes.len(), full_pages * 50 + tail);
        assert_eq!(api.requests().len(), full_pages + 1);
    }
}

#[test]
fn mid_pagination_failure_aborts_the_role() {
    let api = MockApi::new();
    api.serve(page_path(Role::Assassin, 1), position_page("a", 0, 50))
        .fail(page_path(Role::Assassin, 2), "connection reset");

    let err = aggregate_role(&api, RoleFilter::new(Role::Assassin, ALL_LANES))
        .expect_err("second page failure should surface");
    assert!(format!("{err:#}").contains("connection reset"));
}

#[test]
fn aggregate_all_keeps_role_order_and_reports_failures() {
    let api = MockApi::new();
    for filter in ROLE_FILTERS {
        let role = filter.role;
        if role == Role::Mage {
            api.fail(page_path(role, 1), "http 500");
        } else if role == Role::Support {
            api.serve(page_path(role, 1), position_page("s", 0, 0));
        } else {
            api.serve(page_path(role, 1), position_page(role.api_key(), 0, 2));
        }
    }

    let fetch = aggregate_all(&api, 3);
    let roles: Vec<Role> = fetch.rosters.iter().map(|r| r.filter.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::Tank,
            Role::Fighter,
            Role::Assassin,
            Role::Marksman,
            Role::Support
        ]
    );
    // Empty rosters are still returned; skipping them is the renderer's job.
    assert!(fetch.rosters[4].heroes.is_empty());
    assert_eq!(fetch.rosters[0].heroes[0].name, "tank0");
    assert_eq!(fetch.errors.len(), 1);
    assert!(fetch.errors[0].starts_with("Mage roster fetch failed"));
}
