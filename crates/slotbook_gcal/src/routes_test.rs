#[cfg(test)]
mod tests {
    use crate::handlers::GcalState;
    use crate::logic::BookingRules;
    use crate::routes::routes;
    use crate::service::mock::MockCalendarService;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use chrono::{TimeZone, Utc};
    use slotbook_common::{boxed, FixedClock};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    fn create_router() -> Router {
        let clock = FixedClock(Utc.with_ymd_and_hms(2030, 6, 10, 12, 0, 0).unwrap());
        routes(Arc::new(GcalState {
            calendar: boxed(Arc::new(MockCalendarService::new())),
            calendar_id: "primary".into(),
            rules: BookingRules::default(),
            clock: Arc::new(clock),
            event_summary: "Appointment".into(),
            booking_gate: Mutex::new(()),
        }))
    }

    async fn body_text(router: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_path_gets_welcome_page() {
        let (status, body) = body_text(create_router(), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Welcome!</h1>");

        let (status, body) = body_text(create_router(), Method::GET, "/admin").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Welcome!</h1>");
    }

    #[tokio::test]
    async fn test_wrong_method_gets_welcome_page() {
        let (status, body) = body_text(create_router(), Method::GET, "/book").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Welcome!</h1>");

        let (_, body) = body_text(create_router(), Method::POST, "/days?year=2030&month=6").await;
        assert_eq!(body, "<h1>Welcome!</h1>");
    }

    #[tokio::test]
    async fn test_known_routes_answer_json() {
        let (status, body) = body_text(
            create_router(),
            Method::GET,
            "/timeslots?year=2030&month=6&day=15",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"success":true,"timeSlots":[]}"#);
    }
}
