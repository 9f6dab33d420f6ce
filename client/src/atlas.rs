use endonym_map_shared::Region;

/// Fetch the region list served by `/api/regions`, in dataset order.
pub async fn fetch_regions() -> Result<Vec<Region>, String> {
    let resp = gloo_net::http::Request::get("/api/regions")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Vec<Region>>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}
