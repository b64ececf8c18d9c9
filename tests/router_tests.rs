use embedroute::router::{RouteMatch, Router};
use http::Method;

fn zoo_router() -> Router<&'static str> {
    let mut router = Router::new();
    for (method, pattern, handler) in [
        (Method::GET, "/", "root_handler"),
        (Method::GET, "/zoo/animals", "get_animals"),
        (Method::POST, "/zoo/animals", "create_animal"),
        (Method::GET, "/zoo/animals/:id", "get_animal"),
        (Method::PUT, "/zoo/animals/:id", "update_animal"),
        (Method::DELETE, "/zoo/animals/:id", "delete_animal"),
        (Method::GET, "/zoo/animals/:id/photos/*rest", "animal_photos"),
        (Method::HEAD, "/zoo/health", "health_check"),
        (Method::GET, "/zoo/*path", "zoo_fallback"),
    ] {
        router.register(method, pattern, handler).unwrap();
    }
    router
}

fn assert_route_match(router: &Router<&'static str>, method: Method, path: &str, expected_handler: &str) {
    match router.route_path(&method, path) {
        Some(RouteMatch { route, .. }) => {
            assert_eq!(route.handler, expected_handler, "{method} {path}");
        }
        None => panic!("expected {method} {path} to match {expected_handler}"),
    }
}

#[test]
fn test_verbs_and_paths() {
    let router = zoo_router();
    assert_route_match(&router, Method::GET, "/", "root_handler");
    assert_route_match(&router, Method::GET, "/zoo/animals", "get_animals");
    assert_route_match(&router, Method::POST, "/zoo/animals", "create_animal");
    assert_route_match(&router, Method::GET, "/zoo/animals/7", "get_animal");
    assert_route_match(&router, Method::PUT, "/zoo/animals/7", "update_animal");
    assert_route_match(&router, Method::DELETE, "/zoo/animals/7", "delete_animal");
    assert_route_match(&router, Method::HEAD, "/zoo/health", "health_check");
}

#[test]
fn test_wildcard_fallback_loses_to_specific_routes() {
    let router = zoo_router();
    assert_route_match(&router, Method::GET, "/zoo/health", "zoo_fallback");
    assert_route_match(&router, Method::GET, "/zoo/tickets/2024", "zoo_fallback");
    assert_route_match(&router, Method::GET, "/zoo/animals/7/photos/a/b", "animal_photos");
}

#[test]
fn test_unknown_paths() {
    let router = zoo_router();
    assert!(router.route_path(&Method::GET, "/aquarium").is_none());
    assert!(router.route_path(&Method::PATCH, "/zoo/animals/7").is_none());
}

#[test]
fn test_bindings_in_segment_order() {
    let mut router = Router::new();
    router
        .register(Method::GET, "/users/:id/posts/*rest", "posts")
        .unwrap();
    let m = router
        .route_path(&Method::GET, "/users/42/posts/a/b/c")
        .unwrap();
    let params: Vec<(&str, &str)> = m
        .path_params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_str()))
        .collect();
    assert_eq!(params, vec![("id", "42"), ("rest", "a/b/c")]);
}

#[test]
fn test_specificity_beats_registration_order() {
    for order in [["/users/:id", "/users/new"], ["/users/new", "/users/:id"]] {
        let mut router = Router::new();
        for pattern in order {
            router.register(Method::GET, pattern, pattern).unwrap();
        }
        let m = router.route_path(&Method::GET, "/users/new").unwrap();
        assert_eq!(m.route.handler, "/users/new");
        assert_eq!(m.route.score(), 6);

        let m = router.route_path(&Method::GET, "/users/9").unwrap();
        assert_eq!(m.route.handler, "/users/:id");
        assert_eq!(m.route.score(), 5);
    }
}

#[test]
fn test_equal_scores_are_deterministic() {
    let mut router = Router::new();
    router.register(Method::GET, "/a/:x", "first").unwrap();
    router.register(Method::GET, "/:y/b", "second").unwrap();
    let winners: Vec<&str> = (0..5)
        .map(|_| router.route_path(&Method::GET, "/a/b").unwrap().route.handler)
        .collect();
    assert!(winners.iter().all(|w| *w == winners[0]));
}

#[test]
fn test_duplicate_param_names_last_wins() {
    let mut router = Router::new();
    router.register(Method::GET, "/:id/:id", "dup").unwrap();
    let m = router.route_path(&Method::GET, "/1/2").unwrap();
    assert_eq!(m.path_params.len(), 2);
    assert_eq!(m.get_path_param("id"), Some("2"));
}

#[test]
fn test_many_params_spill_to_heap() {
    let pattern: String = (0..12).map(|i| format!("/:p{i}")).collect();
    let path: String = (0..12).map(|i| format!("/v{i}")).collect();
    let mut router = Router::new();
    router.register(Method::GET, &pattern, ()).unwrap();
    let m = router.route_path(&Method::GET, &path).unwrap();
    assert_eq!(m.path_params.len(), 12);
    assert_eq!(m.get_path_param("p11"), Some("v11"));
}
