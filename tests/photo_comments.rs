mod common;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn contents(rows: &Value) -> Vec<String> {
    rows.as_array()
        .expect("expected a row list")
        .iter()
        .map(|row| row["content"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn create_with_unknown_photo_fails_and_persists_nothing() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.register("ann").await?;

    let res = app
        .post_form("/photo_comments?photo_id=999", Some(&token), &[("content", "hi")])
        .await?;
    assert_eq!(res, json!({"code": 1, "data": null, "message": "Photo not found"}));

    let rows = app.get_json("/photo_comments").await?;
    assert_eq!(rows, json!([]));
    Ok(())
}

#[tokio::test]
async fn create_attaches_photo_user_and_timestamps() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.register("ann").await?;
    let photo_id = app.create_photo(&token, "cat").await?;
    let before = Utc::now();

    let photo_id_str = photo_id.to_string();
    let res = app
        .post_form(
            "/photo_comments",
            Some(&token),
            &[("content", "lovely"), ("photo_id", &photo_id_str)],
        )
        .await?;
    assert_eq!(res["code"], 0, "unexpected envelope: {}", res);
    let data = &res["data"];
    let id = data["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(data["content"], "lovely");
    assert_eq!(data["photo_id"], photo_id);
    assert_eq!(data["photo"]["id"], photo_id);
    assert_eq!(data["created_at"], data["updated_at"]);
    let created: DateTime<Utc> = data["created_at"].as_str().unwrap().parse()?;
    assert!((created - before).num_seconds().abs() < 60);

    let rows = app
        .get_json("/photo_comments?query=user.username:ann&fields=id,content")
        .await?;
    assert_eq!(rows, json!([{"id": id, "content": "lovely"}]));

    let one = app.get_json(&format!("/photo_comments/{}", id)).await?;
    assert_eq!(one["user_id"], data["user_id"]);
    Ok(())
}

#[tokio::test]
async fn create_requires_content_and_a_user() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.register("ann").await?;
    let photo_id = app.create_photo(&token, "cat").await?.to_string();

    let res = app
        .post_form(
            "/photo_comments",
            Some(&token),
            &[("content", " "), ("photo_id", &photo_id)],
        )
        .await?;
    assert_eq!(res["code"], 1);
    assert_eq!(res["message"], "content Can not be empty");

    let res = app
        .post_form(
            "/photo_comments",
            None,
            &[("content", "hi"), ("photo_id", &photo_id)],
        )
        .await?;
    assert_eq!(res["code"], 1);
    assert_eq!(res["message"], "Need to be authorized");

    let res = app
        .client
        .post(app.url("/photo_comments"))
        .header("Authorization", "Token not-a-jwt")
        .form(&[("content", "hi"), ("photo_id", photo_id.as_str())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn create_rejects_a_token_for_a_missing_user() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.register("ann").await?;
    let photo_id = app.create_photo(&token, "cat").await?.to_string();

    let ghost = app.token_for(4242)?;
    let res = app
        .post_form(
            "/photo_comments",
            Some(&ghost),
            &[("content", "hi"), ("photo_id", &photo_id)],
        )
        .await?;
    assert_eq!(res, json!({"code": 1, "data": null, "message": "User not found"}));

    let rows = app.get_json("/photo_comments").await?;
    assert_eq!(rows, json!([]));
    Ok(())
}

#[tokio::test]
async fn list_filters_sorts_and_reports_query_errors() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.register("ann").await?;
    let photo_id = app.create_photo(&token, "cat").await?.to_string();
    for content in ["b", "c", "a"] {
        let res = app
            .post_form(
                "/photo_comments",
                Some(&token),
                &[("content", content), ("photo_id", &photo_id)],
            )
            .await?;
        assert_eq!(res["code"], 0);
    }

    let rows = app
        .get_json("/photo_comments?sortby=content,id&order=desc")
        .await?;
    assert_eq!(contents(&rows), ["c", "b", "a"]);

    let rows = app
        .get_json("/photo_comments?sortby=content&order=asc&limit=2&offset=1")
        .await?;
    assert_eq!(contents(&rows), ["b", "c"]);

    let rows = app
        .get_json(&format!("/photo_comments?query=photo_id:{},content:c", photo_id))
        .await?;
    assert_eq!(contents(&rows), ["c"]);

    let res = app.get_json("/photo_comments?query=status1").await?;
    assert_eq!(res, json!("Error: invalid query key/value pair"));

    let res = app.get_json("/photo_comments?order=asc").await?;
    assert_eq!(res, json!("Error: unused 'order' fields"));

    let res = app
        .get_json("/photo_comments?sortby=a,b,c&order=asc,desc")
        .await?;
    assert_eq!(
        res,
        json!("Error: 'sortby', 'order' sizes mismatch or 'order' size is not 1")
    );

    let res = app.get_json("/photo_comments?query=status:1,type:2").await?;
    assert_eq!(res, json!("unknown field `status`"));
    Ok(())
}

#[tokio::test]
async fn update_and_delete_check_existence_first() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.register("ann").await?;
    let photo_id = app.create_photo(&token, "cat").await?;
    let photo_id_str = photo_id.to_string();
    let res = app
        .post_form(
            "/photo_comments",
            Some(&token),
            &[("content", "first"), ("photo_id", &photo_id_str)],
        )
        .await?;
    let id = res["data"]["id"].as_i64().unwrap();

    let missing = app
        .put_json("/photo_comments/9999", &json!({"content": "x"}))
        .await?;
    assert_eq!(missing, json!("Photo comment not found"));
    let missing = app.delete("/photo_comments/abc").await?;
    assert_eq!(missing, json!("Photo comment not found"));
    let unchanged = app.get_json(&format!("/photo_comments/{}", id)).await?;
    assert_eq!(unchanged["content"], "first");

    let ok = app
        .put_json(
            &format!("/photo_comments/{}", id),
            &json!({"content": "second", "photo_id": photo_id}),
        )
        .await?;
    assert_eq!(ok, json!("OK"));
    let updated = app.get_json(&format!("/photo_comments/{}", id)).await?;
    assert_eq!(updated["content"], "second");
    assert_eq!(updated["id"], id);

    assert_eq!(app.delete(&format!("/photo_comments/{}", id)).await?, json!("OK"));
    let gone = app.get_json(&format!("/photo_comments/{}", id)).await?;
    assert_eq!(gone, json!("Photo comment not found"));
    Ok(())
}
