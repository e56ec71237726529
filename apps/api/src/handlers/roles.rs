use super::*;

pub async fn role_permission_matrix_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RolePermissionMatrixResponse>> {
    let role_id = RoleId::new(role_id)?;
    let matrix = state
        .permission_editor_service
        .role_matrix(&user, &role_id)
        .await?;

    Ok(Json(RolePermissionMatrixResponse::from(matrix)))
}

pub async fn toggle_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, permission_key)): Path<(String, String)>,
) -> ApiResult<Json<RolePermissionMatrixResponse>> {
    let role_id = RoleId::new(role_id)?;
    let matrix = state
        .permission_editor_service
        .toggle_permission(&user, &role_id, permission_key.as_str())
        .await?;

    Ok(Json(RolePermissionMatrixResponse::from(matrix)))
}

pub async fn set_view_scope_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, module_id)): Path<(String, String)>,
    Json(payload): Json<SetViewScopeRequest>,
) -> ApiResult<Json<RolePermissionMatrixResponse>> {
    let role_id = RoleId::new(role_id)?;
    let scope = ViewScope::from_transport(payload.scope.as_str())?;
    let matrix = state
        .permission_editor_service
        .set_view_scope(&user, &role_id, module_id.as_str(), scope)
        .await?;

    Ok(Json(RolePermissionMatrixResponse::from(matrix)))
}

pub async fn set_select_all_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, module_id)): Path<(String, String)>,
    Json(payload): Json<SetSelectAllRequest>,
) -> ApiResult<Json<RolePermissionMatrixResponse>> {
    let role_id = RoleId::new(role_id)?;
    let matrix = state
        .permission_editor_service
        .select_all(&user, &role_id, module_id.as_str(), payload.checked)
        .await?;

    Ok(Json(RolePermissionMatrixResponse::from(matrix)))
}

pub async fn click_select_all_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, module_id)): Path<(String, String)>,
) -> ApiResult<Json<RolePermissionMatrixResponse>> {
    let role_id = RoleId::new(role_id)?;
    let matrix = state
        .permission_editor_service
        .click_select_all(&user, &role_id, module_id.as_str())
        .await?;

    Ok(Json(RolePermissionMatrixResponse::from(matrix)))
}
