//! Entity lifecycle against a real SQLite file

mod common;

use std::time::Duration;

use common::{date, generate_author, generate_user, saved_post, saved_user, sqlite_store};
use quill_store::{Store, StoreError, TRANSIENT_ID};

#[tokio::test]
async fn test_transient_until_first_save() {
    let store = sqlite_store().await;

    let mut user = generate_user(&store);
    assert_eq!(user.id(), TRANSIENT_ID);
    assert!(!user.is_persisted());

    user.save().await.unwrap();
    let id = user.id();
    assert!(id > 0);

    // A second save updates in place
    user.set_timezone(2);
    user.save().await.unwrap();
    assert_eq!(user.id(), id);
    assert_eq!(store.find_user_by_id(id).await.unwrap().timezone(), 2);
    assert_eq!(store.find_all_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_round_trip() {
    let store = sqlite_store().await;
    let mut user = saved_user(&store).await;
    user.set_tokens("new-access", "new-refresh");
    user.save().await.unwrap();

    let found = store.find_user_by_id(user.id()).await.unwrap();
    assert_eq!(found.username(), user.username());
    assert_eq!(found.email(), user.email());
    assert_eq!(found.registration_date(), date(1));
    assert_eq!(found.timezone(), -5);
    assert_eq!(found.access_token(), "new-access");
    assert_eq!(found.refresh_token(), "new-refresh");

    let by_oauth = store
        .find_user_by_oauth_id("github", user.oauth_id())
        .await
        .unwrap();
    assert_eq!(by_oauth.id(), user.id());
    let by_name = store.find_user_by_username(user.username()).await.unwrap();
    assert_eq!(by_name.id(), user.id());
}

#[tokio::test]
async fn test_find_missing_is_not_found() {
    let store = sqlite_store().await;

    let err = store.find_post_by_id(42).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(store.find_label_by_name("nope").await.unwrap_err().is_not_found());
    assert!(store.find_all_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_destroy_then_find() {
    let store = sqlite_store().await;
    let author = generate_author(&store).await;
    let post = saved_post(&store, &author, "Gone soon").await;

    post.destroy().await.unwrap();
    // In-memory object is untouched
    assert_eq!(post.title(), "Gone soon");
    assert!(store.find_post_by_id(post.id()).await.unwrap_err().is_not_found());

    let err = post.destroy().await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "post", .. }));
}

#[tokio::test]
async fn test_oauth_lookup_is_scoped_to_provider() {
    let store = sqlite_store().await;
    let github = saved_user(&store).await;

    let mut gitlab = generate_user(&store);
    gitlab.set_oauth_provider("gitlab");
    gitlab.set_oauth_id(github.oauth_id());
    gitlab.save().await.unwrap();

    let found = store
        .find_user_by_oauth_id("gitlab", github.oauth_id())
        .await
        .unwrap();
    assert_eq!(found.id(), gitlab.id());
    assert_eq!(found.oauth_provider(), "gitlab");
    assert!(store
        .find_user_by_oauth_id("bitbucket", github.oauth_id())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_destroy_user_then_find() {
    let store = sqlite_store().await;
    let user = saved_user(&store).await;

    user.destroy().await.unwrap();

    assert!(store.find_user_by_id(user.id()).await.unwrap_err().is_not_found());
    let err = user.destroy().await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "user", .. }));
}

#[tokio::test]
async fn test_destroy_author_keeps_user() {
    let store = sqlite_store().await;
    let author = generate_author(&store).await;
    let post = saved_post(&store, &author, "By a former author").await;

    author.destroy().await.unwrap();

    assert!(store.find_author_by_id(author.id()).await.unwrap_err().is_not_found());
    assert!(store.find_post_by_id(post.id()).await.unwrap_err().is_not_found());
    let user = store.find_user_by_id(author.user().id()).await.unwrap();
    assert!(user.author().await.unwrap().is_none());

    let err = author.destroy().await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "author", .. }));
}

#[tokio::test]
async fn test_destroy_comment_then_find() {
    let store = sqlite_store().await;
    let author = generate_author(&store).await;
    let post = saved_post(&store, &author, "Commented").await;
    let reader = saved_user(&store).await;
    let mut comment = store.new_comment(&reader, &post, "Soon deleted", date(6));
    comment.save().await.unwrap();

    comment.destroy().await.unwrap();

    assert_eq!(comment.content(), "Soon deleted");
    assert!(store.find_comment_by_id(comment.id()).await.unwrap_err().is_not_found());
    assert!(post.comments().await.unwrap().is_empty());
    let err = comment.destroy().await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "comment", .. }));
}

#[tokio::test]
async fn test_destroy_transient_is_not_found() {
    let store = sqlite_store().await;
    let user = generate_user(&store);
    assert!(user.destroy().await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_user_deletion_cascades_to_author() {
    let store = sqlite_store().await;
    let author = generate_author(&store).await;
    let post = saved_post(&store, &author, "Cascade").await;

    author.user().destroy().await.unwrap();

    assert!(store.find_author_by_id(author.id()).await.unwrap_err().is_not_found());
    assert!(store.find_post_by_id(post.id()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_author_links_to_user() {
    let store = sqlite_store().await;
    let author = generate_author(&store).await;

    let found = store.find_author_by_id(author.id()).await.unwrap();
    assert_eq!(found.user().id(), author.user().id());
    assert_eq!(found.twitter(), Some("@quill"));

    let via_user = author.user().author().await.unwrap().unwrap();
    assert_eq!(via_user.id(), author.id());

    let plain = saved_user(&store).await;
    assert!(plain.author().await.unwrap().is_none());
}

#[tokio::test]
async fn test_unsaved_parent_is_rejected() {
    let store = sqlite_store().await;

    let user = generate_user(&store);
    let mut author = store.new_author(&user, None);
    let err = author.save().await.unwrap_err();
    assert!(matches!(err, StoreError::NotPersisted { entity: "user" }));
    assert_eq!(author.id(), TRANSIENT_ID);

    let author = generate_author(&store).await;
    let post = store.new_post(&author, "Draft", "", "", date(3));
    let mut comment = store.new_comment(author.user(), &post, "first", date(4));
    assert!(matches!(
        comment.save().await.unwrap_err(),
        StoreError::NotPersisted { entity: "post" }
    ));
}

#[tokio::test]
async fn test_duplicate_username_is_constraint_violation() {
    let store = sqlite_store().await;
    let user = saved_user(&store).await;

    let mut twin = generate_user(&store);
    twin.set_username(user.username());
    let err = twin.save().await.unwrap_err();
    assert!(err.is_constraint_violation(), "got {err:?}");
    assert_eq!(twin.id(), TRANSIENT_ID);
}

#[tokio::test]
async fn test_post_update_and_listing_order() {
    let store = sqlite_store().await;
    let author = generate_author(&store).await;
    let first = saved_post(&store, &author, "First").await;
    let mut second = saved_post(&store, &author, "Second").await;

    second.set_title("Second, edited");
    second.set_content("new body");
    second.save().await.unwrap();

    let posts = author.posts().await.unwrap();
    let titles: Vec<_> = posts.iter().map(|p| p.title()).collect();
    assert_eq!(titles, ["First", "Second, edited"]);
    assert_eq!(posts[0].id(), first.id());
    assert_eq!(posts[1].content(), "new body");
    assert_eq!(posts[1].author().user().id(), author.user().id());
}

#[tokio::test]
async fn test_comments_on_post_and_user() {
    let store = sqlite_store().await;
    let author = generate_author(&store).await;
    let post = saved_post(&store, &author, "Discuss").await;
    let reader = saved_user(&store).await;

    let mut comment = store.new_comment(&reader, &post, "Nice post", date(5));
    comment.save().await.unwrap();
    comment.set_up_vote(3);
    comment.set_down_vote(1);
    comment.save().await.unwrap();

    let on_post = post.comments().await.unwrap();
    assert_eq!(on_post.len(), 1);
    assert_eq!(on_post[0].up_vote(), 3);
    assert_eq!(on_post[0].down_vote(), 1);
    assert_eq!(on_post[0].date(), date(5));

    assert_eq!(reader.comments().await.unwrap().len(), 1);
    assert!(author.user().comments().await.unwrap().is_empty());

    assert_eq!(comment.user().await.unwrap().id(), reader.id());
    assert_eq!(comment.post().await.unwrap().id(), post.id());

    post.destroy().await.unwrap();
    assert!(store.find_comment_by_id(comment.id()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_stats_and_teardown() {
    let store = sqlite_store().await;
    let author = generate_author(&store).await;
    let post = saved_post(&store, &author, "Counted").await;
    post.add_label("stats").await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.users, 1);
    assert_eq!(stats.authors, 1);
    assert_eq!(stats.posts, 1);
    assert_eq!(stats.labels, 1);
    assert_eq!(stats.comments, 0);

    store.teardown().await.unwrap();
    assert!(store.find_all_users().await.is_err());
}

#[tokio::test]
async fn test_serialization_skips_tokens() {
    let store = sqlite_store().await;
    let user = saved_user(&store).await;

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["username"], user.username());
    assert_eq!(json["provider"], "github");
    assert!(json.get("access_token").is_none());
    assert!(json.get("refresh_token").is_none());
}

#[tokio::test]
async fn test_with_deadline() {
    let store = sqlite_store().await;

    let users = Store::with_deadline(Duration::from_secs(5), store.find_all_users())
        .await
        .unwrap();
    assert!(users.is_empty());

    let slow = async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<(), StoreError>(())
    };
    let err = Store::with_deadline(Duration::from_millis(10), slow)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Timeout));
}
