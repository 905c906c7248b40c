#[cfg(test)]
mod integration_tests {
    use crate::{
        ContentFetcher, HttpFetcher, MeasurementStage, MockRenderEngine, PageReadyCondition,
        WebSize, WebSizeOptions,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    const TEST_AGENT: &str = "WebSize Test Agent";

    /// Minimal HTTP/1.1 responder: answers every connection with `response`
    /// and forwards the request head it received.
    async fn spawn_server(response: String) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let response = response.clone();
                let requests_tx = requests_tx.clone();

                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    let _ = requests_tx.send(String::from_utf8_lossy(&head).to_string());
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{addr}/"), requests_rx)
    }

    fn fixed_length_response(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn chunked_response() -> String {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n5\r\nhello\r\n0\r\n\r\n"
            .to_string()
    }

    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/")
    }

    fn measurer(renderer: MockRenderEngine) -> WebSize<HttpFetcher, MockRenderEngine> {
        let options = WebSizeOptions {
            user_agent: TEST_AGENT.to_string(),
            ..Default::default()
        };
        let fetcher = HttpFetcher::new(options.user_agent.clone(), options.fetch_timeout).unwrap();
        WebSize::with_components(options, fetcher, renderer)
    }

    #[tokio::test]
    async fn test_one_kilobyte_page_with_content_length() {
        let (url, _requests) = spawn_server(fixed_length_response(&"a".repeat(1024))).await;

        let mut renderer = MockRenderEngine::new();
        renderer
            .expect_render()
            .times(1)
            .returning(|_, _| Ok("<html><head></head><body></body></html>".to_string()));

        let result = measurer(renderer).measure(&url).await.unwrap();

        assert!((result.raw_size_kb - 1.0).abs() < 1e-9);
        let transfer = result.transfer_size_mb.expect("content-length was declared");
        assert!((transfer - 1024.0 / 1_048_576.0).abs() < 1e-12);
        assert!(result.render_time_seconds > 0.0);
        assert!(result.rendered_size_kb >= 0.0);
    }

    #[tokio::test]
    async fn test_missing_content_length_leaves_transfer_size_unknown() {
        let (url, _requests) = spawn_server(chunked_response()).await;

        let mut renderer = MockRenderEngine::new();
        renderer.expect_render().returning(|_, _| Ok("<html></html>".to_string()));

        let result = measurer(renderer).measure(&url).await.unwrap();

        assert_eq!(result.raw_size_kb, 5.0 / 1024.0);
        assert_eq!(result.transfer_size_mb, None);
    }

    #[tokio::test]
    async fn test_fetch_sends_configured_user_agent() {
        let (url, mut requests) = spawn_server(fixed_length_response("<html></html>")).await;

        let fetcher = HttpFetcher::new(TEST_AGENT, None).unwrap();
        let page = fetcher.fetch(&url).await.unwrap();
        assert_eq!(page.raw_html, "<html></html>");

        let head = requests.recv().await.unwrap().to_lowercase();
        assert!(head.starts_with("get / http/1.1"));
        assert!(head.contains(&format!("user-agent: {}", TEST_AGENT.to_lowercase())));
    }

    #[tokio::test]
    async fn test_unreachable_host_never_launches_renderer() {
        let url = closed_port_url().await;

        let fetch_error = HttpFetcher::new(TEST_AGENT, None)
            .unwrap()
            .fetch(&url)
            .await
            .unwrap_err();

        let mut renderer = MockRenderEngine::new();
        renderer.expect_render().never();

        let err = measurer(renderer).measure(&url).await.unwrap_err();

        assert_eq!(err.stage(), Some(MeasurementStage::Fetch));
        assert!(err.to_string().starts_with("Failed to calculate page size"));
        assert!(err.to_string().contains(&fetch_error.to_string()));
    }

    #[tokio::test]
    async fn test_measure_once_fails_before_browser_on_fetch_error() {
        let url = closed_port_url().await;

        let err = crate::measure_once(&url, None).await.unwrap_err();
        assert_eq!(err.stage(), Some(MeasurementStage::Fetch));
    }

    #[tokio::test]
    async fn test_repeated_measurements_share_options() {
        let (url, _requests) = spawn_server(fixed_length_response(&"b".repeat(2048))).await;

        let mut renderer = MockRenderEngine::new();
        renderer
            .expect_render()
            .times(2)
            .withf(|_, wait_until| *wait_until == PageReadyCondition::NetworkIdleRelaxed)
            .returning(|_, _| Ok("x".repeat(512)));

        let web_size = measurer(renderer);
        let first = web_size.measure(&url).await.unwrap();
        let second = web_size.measure(&url).await.unwrap();

        assert_eq!(first.raw_size_kb, 2.0);
        assert_eq!(second.raw_size_kb, 2.0);
        assert_eq!(first.rendered_size_kb, second.rendered_size_kb);
    }

    // Needs a local Chrome; environments without one only warn
    #[tokio::test]
    async fn test_real_browser_measurement() {
        let (url, _requests) = spawn_server(fixed_length_response(
            "<html><body><script>document.body.appendChild(document.createElement('main'))</script></body></html>",
        ))
        .await;

        let options = WebSizeOptions {
            wait_until: PageReadyCondition::Load,
            ..Default::default()
        };

        match crate::measure_once(&url, Some(options)).await {
            Ok(result) => {
                assert!(result.raw_size_kb > 0.0);
                assert!(result.rendered_size_kb > 0.0);
                assert!(result.render_time_seconds > 0.0);
                assert!(result.transfer_size_mb.is_some());
            }
            Err(e) => {
                assert_eq!(e.stage(), Some(MeasurementStage::Render));
                eprintln!("⚠️  Browser measurement failed (expected without Chrome): {e}");
            }
        }
    }
}
