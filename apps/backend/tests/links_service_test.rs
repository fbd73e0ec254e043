mod support;

use backend::cache::keys;
use backend::error::AppError;
use backend::services::links::{CreateLinkInput, UpdateLinkInput};
use support::{harness, seeded_user, unique_username};

fn github_link(title: &str) -> CreateLinkInput {
    CreateLinkInput {
        platform: "github".to_string(),
        url: "https://github.com/someone".to_string(),
        title: title.to_string(),
    }
}

#[tokio::test]
async fn test_create_appends_at_the_end_and_invalidates() {
    let h = harness();
    let user = seeded_user(&unique_username("mk"));
    let (id, username) = (user.id, user.username.clone());
    h.users.seed(user);

    // Warm the caches that the write must drop.
    h.link_service.list_links(id).await.unwrap();
    h.profiles.get_public_profile(&username).await.unwrap();

    let first = h
        .link_service
        .create_link(id, github_link("First"))
        .await
        .unwrap();
    let second = h
        .link_service
        .create_link(id, github_link("Second"))
        .await
        .unwrap();

    assert_eq!(first.display_order, 0);
    assert_eq!(second.display_order, 1);
    assert!(second.is_active);

    assert!(!h.store.contains(&keys::links_key(id)));
    assert!(!h.store.contains(&keys::public_profile_key(&username)));
}

#[tokio::test]
async fn test_create_validates_platform_and_url() {
    let h = harness();
    let user = seeded_user(&unique_username("badmk"));
    let id = user.id;
    h.users.seed(user);

    let err = h
        .link_service
        .create_link(
            id,
            CreateLinkInput {
                platform: "myspace".to_string(),
                url: "https://myspace.com/me".to_string(),
                title: "Old times".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 400);

    let err = h
        .link_service
        .create_link(
            id,
            CreateLinkInput {
                platform: "github".to_string(),
                url: "https://example.com/not-github".to_string(),
                title: "Wrong host".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 400);

    let err = h
        .link_service
        .create_link(id, github_link("   "))
        .await
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 400);
}

#[tokio::test]
async fn test_update_checks_the_resulting_platform_url_pair() {
    let h = harness();
    let user = seeded_user(&unique_username("pairs"));
    let id = user.id;
    h.users.seed(user);

    let link = h
        .link_service
        .create_link(id, github_link("Code"))
        .await
        .unwrap();

    // Changing only the platform must be validated against the kept URL.
    let err = h
        .link_service
        .update_link(
            id,
            link.id,
            UpdateLinkInput {
                platform: Some("twitch".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 400);

    // Changing both consistently is fine.
    let updated = h
        .link_service
        .update_link(
            id,
            link.id,
            UpdateLinkInput {
                platform: Some("twitch".to_string()),
                url: Some("https://twitch.tv/someone".to_string()),
                title: Some("Streams".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.platform, "twitch");
    assert_eq!(updated.title, "Streams");
}

#[tokio::test]
async fn test_only_the_owner_may_touch_a_link() {
    let h = harness();
    let owner = seeded_user(&unique_username("owner"));
    let intruder = seeded_user(&unique_username("intruder"));
    let (owner_id, intruder_id) = (owner.id, intruder.id);
    h.users.seed(owner);
    h.users.seed(intruder);

    let link = h
        .link_service
        .create_link(owner_id, github_link("Mine"))
        .await
        .unwrap();

    let err = h
        .link_service
        .delete_link(intruder_id, link.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
    assert_eq!(err.status().as_u16(), 403);

    let err = h
        .link_service
        .toggle_link(intruder_id, link.id)
        .await
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 403);

    // The owner still can.
    assert!(h.link_service.delete_link(owner_id, link.id).await.is_ok());
}

#[tokio::test]
async fn test_toggle_flips_visibility_without_deleting() {
    let h = harness();
    let user = seeded_user(&unique_username("tog"));
    let (id, username) = (user.id, user.username.clone());
    h.users.seed(user);

    let link = h
        .link_service
        .create_link(id, github_link("Sometimes"))
        .await
        .unwrap();
    assert!(link.is_active);

    let hidden = h.link_service.toggle_link(id, link.id).await.unwrap();
    assert!(!hidden.is_active);

    // Hidden links disappear from the public page but stay in the owner list.
    let view = h.profiles.get_public_profile(&username).await.unwrap();
    assert!(view.links.is_empty());
    assert_eq!(h.link_service.list_links(id).await.unwrap().len(), 1);

    let shown = h.link_service.toggle_link(id, link.id).await.unwrap();
    assert!(shown.is_active);
}

#[tokio::test]
async fn test_reorder_applies_the_permutation() {
    let h = harness();
    let user = seeded_user(&unique_username("ord"));
    let id = user.id;
    h.users.seed(user);

    let a = h.link_service.create_link(id, github_link("A")).await.unwrap();
    let b = h.link_service.create_link(id, github_link("B")).await.unwrap();
    let c = h.link_service.create_link(id, github_link("C")).await.unwrap();

    let reordered = h
        .link_service
        .reorder_links(id, vec![c.id, a.id, b.id])
        .await
        .unwrap();

    let titles: Vec<&str> = reordered.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["C", "A", "B"]);
    let orders: Vec<i32> = reordered.iter().map(|l| l.display_order).collect();
    assert_eq!(orders, [0, 1, 2]);
}

#[tokio::test]
async fn test_reorder_rejects_incomplete_or_foreign_id_sets() {
    let h = harness();
    let user = seeded_user(&unique_username("ordbad"));
    let id = user.id;
    h.users.seed(user);

    let a = h.link_service.create_link(id, github_link("A")).await.unwrap();
    let b = h.link_service.create_link(id, github_link("B")).await.unwrap();

    // Missing one id.
    assert_eq!(
        h.link_service
            .reorder_links(id, vec![a.id])
            .await
            .unwrap_err()
            .status()
            .as_u16(),
        400
    );

    // Duplicated id.
    assert_eq!(
        h.link_service
            .reorder_links(id, vec![a.id, a.id])
            .await
            .unwrap_err()
            .status()
            .as_u16(),
        400
    );

    // Someone else's link id.
    let other = seeded_user(&unique_username("other"));
    let other_id = other.id;
    h.users.seed(other);
    let foreign = h
        .link_service
        .create_link(other_id, github_link("Foreign"))
        .await
        .unwrap();
    assert_eq!(
        h.link_service
            .reorder_links(id, vec![a.id, foreign.id])
            .await
            .unwrap_err()
            .status()
            .as_u16(),
        400
    );

    // Order unchanged after the failed attempts.
    let listed = h.link_service.list_links(id).await.unwrap();
    assert_eq!(listed[0].id, a.id);
    assert_eq!(listed[1].id, b.id);
}
