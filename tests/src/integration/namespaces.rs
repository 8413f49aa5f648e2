//! # Namespaced Modules
//!
//! Two independently written modules use the same short names through their
//! own scopes. A host sees both under fully qualified names.

#[cfg(test)]
mod tests {
    use crate::fixtures::{LifecycleRecorder, Recorder};
    use crosstalk::{
        BusError, CrossTalk, IdentifierKind, LifecycleSubscribeOptions, MessageBus,
        MessageBusExt,
    };
    use serde_json::json;

    #[test]
    fn test_same_short_names_do_not_collide() {
        let bus = CrossTalk::new();
        let cart = bus.scope("cart").unwrap();
        let search = bus.scope("search").unwrap();

        cart.set_state("count", json!(3)).unwrap();
        search.set_state("count", json!(42)).unwrap();

        assert_eq!(cart.get_state("count").unwrap(), Some(json!(3)));
        assert_eq!(search.get_state("count").unwrap(), Some(json!(42)));
        assert_eq!(bus.get_state("cart:count").unwrap(), Some(json!(3)));
        assert_eq!(bus.get_state("search:count").unwrap(), Some(json!(42)));
    }

    #[test]
    fn test_sibling_state_watchers_stay_in_their_scope() {
        let bus = CrossTalk::new();
        let cart = bus.scope("cart").unwrap();
        let wishlist = bus.scope("wishlist").unwrap();
        cart.set_state("updated", json!(1)).unwrap();
        wishlist.set_state("updated", json!("w0")).unwrap();

        let cart_watch = Recorder::new();
        let wishlist_watch = Recorder::new();
        let root_watch = Recorder::new();
        let _a = cart.subscribe_state("updated", cart_watch.handler.clone()).unwrap();
        let _b = wishlist
            .subscribe_state("updated", wishlist_watch.handler.clone())
            .unwrap();
        let _c = bus.subscribe_state("updated", root_watch.handler.clone()).unwrap();

        assert_eq!(cart_watch.values(), vec![json!(1)]);
        assert_eq!(wishlist_watch.values(), vec![json!("w0")]);

        cart.set_state("updated", json!(2)).unwrap();
        wishlist.set_state("updated", json!("w1")).unwrap();
        cart.set_state("updated", json!(3)).unwrap();

        assert_eq!(cart_watch.values(), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(wishlist_watch.values(), vec![json!("w0"), json!("w1")]);
        assert_eq!(root_watch.count(), 0);
        assert_eq!(bus.get_state("updated").unwrap(), None);
    }

    #[test]
    fn test_host_observes_scoped_traffic() {
        let bus = CrossTalk::new();
        let host = Recorder::new();
        let _sub = bus.subscribe("cart:checkout", host.handler.clone()).unwrap();

        bus.scope("cart")
            .unwrap()
            .publish("checkout", json!({"total": 10}))
            .unwrap();

        assert_eq!(host.values(), vec![json!({"total": 10})]);
    }

    #[test]
    fn test_nested_scope_reaches_root_key() {
        let bus = CrossTalk::new();
        let oauth = bus.scope("auth").unwrap().scope("oauth").unwrap();
        oauth.set_state_as("token", &"abc").unwrap();

        assert_eq!(
            bus.get_state_as::<String>("auth:oauth:token").unwrap(),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_scope_shares_lifecycle_with_root() {
        let bus = CrossTalk::new();
        let root_watcher = LifecycleRecorder::new();
        let _sub = bus.subscribe_lifecycle(
            root_watcher.handler.clone(),
            LifecycleSubscribeOptions::default(),
        );

        bus.scope("plugins").unwrap().announce_available("search", None).unwrap();

        assert_eq!(root_watcher.events()[0].id, "search");
        assert_eq!(bus.available(), vec!["search".to_string()]);
    }

    #[test]
    fn test_scope_validation_uses_unprefixed_name() {
        let scope = CrossTalk::new().scope("ns").unwrap();
        let err = scope.publish("  ", json!(1)).unwrap_err();
        assert_eq!(err, BusError::invalid(IdentifierKind::EventName));
        assert_eq!(err.to_string(), "Event name must be a non-empty string.");
    }

    #[test]
    fn test_scope_cannot_destroy_root() {
        let bus = CrossTalk::new();
        let scope = bus.scope("cart").unwrap();
        scope.set_state("count", json!(1)).unwrap();

        let err = scope.destroy().unwrap_err();
        assert!(err.to_string().contains("scoped instance \"cart\""));
        assert_eq!(bus.get_state("cart:count").unwrap(), Some(json!(1)));

        bus.destroy().unwrap();
        assert_eq!(scope.get_state("count").unwrap(), None);
    }
}
