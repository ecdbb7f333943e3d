//! `CatalogWrapper` over real HTTP against the mock server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use catalog_client::{
    ApiError, CartItem, CatalogWrapper, ClientConfig, Credential, Endpoint, Operation, OperationName,
    ResponseGroup, SearchIndex,
};

async fn start_server() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    addr
}

fn config(base_url: &str, secret: &str) -> ClientConfig {
    ClientConfig::new(
        Credential::new(mock_server::ACCESS_KEY, secret),
        Endpoint::parse(base_url).unwrap(),
    )
    .with_timeout(Duration::from_secs(10))
}

#[tokio::test]
async fn operations_round_trip() {
    let addr = start_server().await;
    let mut catalog = CatalogWrapper::new(config(&format!("http://{addr}"), mock_server::SECRET_KEY)).unwrap();
    let bodies = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&bodies);
    catalog.on_xml_received(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let found = catalog.lookup("B01N5IB20Q", ResponseGroup::Large).await.unwrap().unwrap();
    let attributes = found.items.item[0].item_attributes.as_ref().unwrap();
    assert_eq!(attributes.manufacturer.as_deref(), Some("Logitech"));
    assert_eq!(attributes.list_price.as_ref().unwrap().formatted_price.as_deref(), Some("$24.99"));

    let found = catalog
        .lookup_many(&["0679722769", "B000000000"], ResponseGroup::Small)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.items.item.len(), 1);
    assert!(!found.items.request.as_ref().unwrap().errors().is_empty());

    let results = catalog
        .search("pencil", SearchIndex::All, ResponseGroup::Small)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(results.items.item[0].asin, "B00005N5PF");

    let page = catalog
        .search_page("pencil", SearchIndex::All, ResponseGroup::Small, Some(2))
        .await
        .unwrap()
        .unwrap();
    assert!(page.items.item.is_empty());

    let nodes = catalog
        .browse_node_lookup(283155, ResponseGroup::BrowseNodeInfo)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(nodes.browse_nodes.browse_node[0].name.as_deref(), Some("Books"));

    let cart = catalog
        .cart_create(&[CartItem::new("1593278284", 3)])
        .await
        .unwrap()
        .unwrap()
        .cart;
    assert_eq!(cart.lines()[0].quantity, 3);

    assert_eq!(bodies.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn wrong_secret_is_delivered_to_subscribers() {
    let addr = start_server().await;
    let mut catalog = CatalogWrapper::new(config(&format!("http://{addr}"), "not-the-secret")).unwrap();
    let codes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&codes);
    catalog.on_error_received(move |e| sink.lock().unwrap().extend(e.errors.iter().map(|d| d.code.clone())));

    let result = catalog.search("pencil", SearchIndex::All, ResponseGroup::Small).await.unwrap();
    assert!(result.is_none());
    assert_eq!(*codes.lock().unwrap(), ["SignatureDoesNotMatch"]);
}

#[tokio::test]
async fn raw_request_passes_error_statuses_through() {
    let addr = start_server().await;
    let catalog = CatalogWrapper::new(config(&format!("http://{addr}"), mock_server::SECRET_KEY)).unwrap();

    let op = Operation::new(OperationName::Other("CartExplode".to_string()), [("CartId", "1")]);
    let response = catalog.request(&op).await.unwrap();
    assert_eq!(response.status, 400);
    assert!(response.body.contains("<CartExplodeErrorResponse"));
}

#[tokio::test]
async fn closed_port_is_no_response() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let mut catalog = CatalogWrapper::new(config(&format!("http://{addr}"), mock_server::SECRET_KEY)).unwrap();
    let notified = Arc::new(AtomicUsize::new(0));
    let (xml, err) = (Arc::clone(&notified), Arc::clone(&notified));
    catalog
        .on_xml_received(move |_| {
            xml.fetch_add(1, Ordering::SeqCst);
        })
        .on_error_received(move |_| {
            err.fetch_add(1, Ordering::SeqCst);
        });

    let result = catalog.browse_node_lookup(283155, ResponseGroup::BrowseNodeInfo).await;
    assert!(matches!(result, Err(ApiError::NoResponse(_))));
    assert_eq!(notified.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn shared_wrapper_serves_concurrent_tasks() {
    let addr = start_server().await;
    let catalog = Arc::new(CatalogWrapper::new(config(&format!("http://{addr}"), mock_server::SECRET_KEY)).unwrap());

    let tasks: Vec<_> = ["B00005N5PF", "0679722769", "B01N5IB20Q", "1593278284"]
        .into_iter()
        .map(|asin| {
            let catalog = Arc::clone(&catalog);
            tokio::spawn(async move { catalog.lookup(asin, ResponseGroup::Small).await })
        })
        .collect();

    for (task, asin) in tasks.into_iter().zip(["B00005N5PF", "0679722769", "B01N5IB20Q", "1593278284"]) {
        let found = task.await.unwrap().unwrap().unwrap();
        assert_eq!(found.items.item[0].asin, asin);
    }
}

#[tokio::test]
async fn maintenance_page_is_malformed() {
    let addr = start_server().await;
    let catalog = CatalogWrapper::new(config(&format!("http://{addr}/maintenance"), mock_server::SECRET_KEY)).unwrap();

    let err = catalog.lookup("B00005N5PF", ResponseGroup::Small).await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse { status: 503, .. }));
}
