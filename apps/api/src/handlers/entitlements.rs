use super::*;

const MAX_TEASER_ITEMS: usize = 1000;

pub async fn entitlement_overview_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<EntitlementOverviewResponse>> {
    let overview = state.entitlement_service.overview(&user).await?;

    Ok(Json(EntitlementOverviewResponse::from(overview)))
}

pub async fn trial_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Option<TrialStatusResponse>>> {
    let status = state.entitlement_service.trial_status(&user).await?;

    Ok(Json(status.map(TrialStatusResponse::from)))
}

pub async fn tier_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(required_tier): Path<String>,
) -> ApiResult<Json<TierAccessResponse>> {
    let required_tier = PlanTier::from_transport(required_tier.as_str())?;
    state
        .entitlement_service
        .require_tier(&user, required_tier)
        .await?;
    let effective_tier = state.entitlement_service.effective_tier(&user).await?;

    Ok(Json(TierAccessResponse {
        required_tier: required_tier.as_str().to_owned(),
        effective_tier: effective_tier.as_str().to_owned(),
    }))
}

pub async fn teaser_lock_states_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<TeaserQuery>,
) -> ApiResult<Json<Vec<TeaserLockStateResponse>>> {
    if query.count > MAX_TEASER_ITEMS {
        return Err(AppError::Validation(format!(
            "count must not exceed {MAX_TEASER_ITEMS}"
        ))
        .into());
    }

    let states = state
        .entitlement_service
        .teaser_lock_states(&user, query.count, &state.teaser_policy)
        .await?;

    Ok(Json(TeaserLockStateResponse::from_states(states)))
}

pub async fn replace_entitlement_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(payload): Json<ReplaceEntitlementRequest>,
) -> ApiResult<StatusCode> {
    let entitlement = payload.into_entitlement()?;
    state
        .entitlement_service
        .record_entitlement(BILLING_SUBJECT, subject.as_str(), entitlement)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
