use super::*;

pub async fn permission_check_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_key): Path<String>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let allowed = state
        .access_control_service
        .is_allowed(&user, permission_key.as_str())
        .await?;

    Ok(Json(PermissionCheckResponse {
        permission_key,
        allowed,
    }))
}

pub async fn view_scope_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(module_id): Path<String>,
) -> ApiResult<Json<ViewScopeResponse>> {
    let scope = state
        .access_control_service
        .view_scope(&user, module_id.as_str())
        .await?;

    Ok(Json(ViewScopeResponse::new(module_id, scope)))
}

pub async fn record_visibility_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(module_id): Path<String>,
    Query(query): Query<RecordVisibilityQuery>,
) -> ApiResult<Json<RecordVisibilityResponse>> {
    let scope = state
        .access_control_service
        .require_view_scope(&user, module_id.as_str())
        .await?;
    let visible = state
        .access_control_service
        .can_view_record(&user, module_id.as_str(), query.assigned_to.as_deref())
        .await?;

    Ok(Json(RecordVisibilityResponse {
        module_id,
        scope: scope.as_str().to_owned(),
        visible,
    }))
}
