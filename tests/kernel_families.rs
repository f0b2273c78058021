mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::*;

#[tokio::test]
async fn create_family_normalizes_cpf_and_audits() {
    let app = app().await;
    let token = app.login(OPERATOR).await;

    let res = app
        .post(
            "/families",
            &token,
            json!({
                "responsible_full_name": "  Maria da Silva ",
                "responsible_cpf": VALID_CPF,
                "phone": "11 99999-0000",
            }),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(
        res.json()["item"],
        json!({
            "id": 1,
            "responsible_full_name": "Maria da Silva",
            "responsible_cpf": "52998224725",
            "phone": "11 99999-0000",
            "address": null,
        })
    );

    let event = app.audit.events().pop().unwrap();
    assert_eq!(event.action, "family.create");
    assert_eq!(event.actor, Some(2));
    assert_eq!(event.context, json!({ "family_id": 1 }));
}

#[tokio::test]
async fn duplicate_cpf_conflicts_regardless_of_formatting() {
    let app = app().await;
    let token = app.login(ADMIN).await;
    app.create_family(&token, "Maria", VALID_CPF).await;

    let res = app
        .post(
            "/families",
            &token,
            json!({ "responsible_full_name": "Outra", "responsible_cpf": "52998224725" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(error_code(&res), "duplicate_cpf");

    let list = app.get("/families", &token).await;
    assert_eq!(list.json()["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_cpf_and_missing_fields_are_rejected() {
    let app = app().await;
    let token = app.login(ADMIN).await;

    for cpf in ["111.111.111-11", "529.982.247-24", "123"] {
        let res = app
            .post(
                "/families",
                &token,
                json!({ "responsible_full_name": "Maria", "responsible_cpf": cpf }),
            )
            .await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY, "{cpf}");
        assert_eq!(error_code(&res), "invalid_cpf");
    }

    let res = app
        .post("/families", &token, json!({ "responsible_cpf": VALID_CPF }))
        .await;
    assert_eq!(error_code(&res), "invalid_payload");
    assert!(res.json()["details"]["responsible_full_name"].is_array());

    let res = app.post("/families", &token, Value::Null).await;
    assert_eq!(error_code(&res), "invalid_payload");

    assert!(app.actions().iter().all(|a| a != "family.create"));
}

#[tokio::test]
async fn reader_can_list_but_not_write() {
    let app = app().await;
    let reader = app.login(READER).await;

    assert_eq!(app.get("/families", &reader).await.status, StatusCode::OK);

    let res = app
        .post(
            "/families",
            &reader,
            json!({ "responsible_full_name": "Maria", "responsible_cpf": VALID_CPF }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&res), "forbidden");
}

#[tokio::test]
async fn pastoral_role_can_write_families() {
    let app = app().await;
    let pastoral = app.login(PASTORAL).await;
    app.create_family(&pastoral, "Maria", VALID_CPF).await;
}

#[tokio::test]
async fn update_family_checks_cpf_against_other_families() {
    let app = app().await;
    let token = app.login(ADMIN).await;
    let first = app.create_family(&token, "Maria", VALID_CPF).await;
    let second = app.create_family(&token, "João", OTHER_CPF).await;

    let res = app
        .put(
            &format!("/families/{second}"),
            &token,
            json!({ "responsible_full_name": "João", "responsible_cpf": VALID_CPF }),
        )
        .await;
    assert_eq!(error_code(&res), "duplicate_cpf");

    // Manter o próprio CPF não é conflito.
    let res = app
        .put(
            &format!("/families/{first}"),
            &token,
            json!({
                "responsible_full_name": "Maria Souza",
                "responsible_cpf": VALID_CPF,
                "address": "Rua A, 10",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["item"]["responsible_full_name"], "Maria Souza");
    assert_eq!(res.json()["item"]["address"], "Rua A, 10");

    let res = app
        .put(
            "/families/99",
            &token,
            json!({ "responsible_full_name": "X", "responsible_cpf": THIRD_CPF }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&res), "family_not_found");
}

#[tokio::test]
async fn family_detail_includes_members_and_delete_cascades() {
    let app = app().await;
    let token = app.login(OPERATOR).await;
    let family = app.create_family(&token, "Maria", VALID_CPF).await;
    let other = app.create_family(&token, "João", OTHER_CPF).await;

    let res = app
        .post(
            "/dependents",
            &token,
            json!({ "family_id": family, "full_name": "Pedro", "relationship": "filho" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app
        .post(
            "/children",
            &token,
            json!({ "family_id": family.to_string(), "full_name": "Ana", "birth_date": "2019-05-02" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["item"]["birth_date"], "2019-05-02");

    app.post(
        "/children",
        &token,
        json!({ "family_id": other, "full_name": "Lia" }),
    )
    .await;

    let detail = app.get(&format!("/families/{family}"), &token).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.json()["item"]["id"], family);
    assert_eq!(detail.json()["dependents"][0]["full_name"], "Pedro");
    assert_eq!(detail.json()["children"].as_array().unwrap().len(), 1);

    let res = app.delete(&format!("/families/{family}"), &token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["deleted"], true);

    let res = app.get(&format!("/families/{family}"), &token).await;
    assert_eq!(error_code(&res), "family_not_found");

    let dependents = app.get("/dependents", &token).await;
    assert_eq!(dependents.json()["items"], json!([]));
    let children = app.get("/children", &token).await;
    assert_eq!(children.json()["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn members_require_an_existing_family() {
    let app = app().await;
    let token = app.login(ADMIN).await;

    let res = app
        .post("/dependents", &token, json!({ "family_id": 42, "full_name": "Pedro" }))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&res), "family_not_found");

    let res = app
        .post("/children", &token, json!({ "family_id": 42, "full_name": "Ana" }))
        .await;
    assert_eq!(error_code(&res), "family_not_found");

    let res = app.delete("/dependents/7", &token).await;
    assert_eq!(error_code(&res), "dependent_not_found");
    let res = app.delete("/children/7", &token).await;
    assert_eq!(error_code(&res), "child_not_found");
}

#[tokio::test]
async fn member_lists_filter_by_family_query_parameter() {
    let app = app().await;
    let token = app.login(ADMIN).await;
    let first = app.create_family(&token, "Maria", VALID_CPF).await;
    let second = app.create_family(&token, "João", OTHER_CPF).await;

    for (family, name) in [(first, "Pedro"), (second, "Paulo"), (second, "Tiago")] {
        app.post("/dependents", &token, json!({ "family_id": family, "full_name": name }))
            .await;
    }

    let res = app
        .call(
            Method::GET,
            "/dependents",
            Some(&token),
            json!({ "family_id": second.to_string() }),
        )
        .await;
    let names: Vec<&str> = res.json()["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Paulo", "Tiago"]);

    let all = app.get("/dependents", &token).await;
    assert_eq!(all.json()["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn non_numeric_ids_do_not_match_routes() {
    let app = app().await;
    let token = app.login(ADMIN).await;

    let res = app.get("/families/abc", &token).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&res), "not_found");
}
