use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use serde_json::{Value, json};
use tempfile::TempDir;

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub client: reqwest::Client,
    server_process: Option<Child>,
}

/// A signed-up account and the token it was issued.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_curio"))
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(None).await
    }

    /// Starts a server whose data directory carries the given `curio.toml`.
    pub async fn start_with_config(config: &str) -> Self {
        Self::start_with(Some(config)).await
    }

    async fn start_with(config: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let data_dir = temp_dir.path();

        let init_output = Command::new(binary())
            .args(["init", "--data-dir"])
            .arg(data_dir)
            .output()
            .expect("run init");
        assert!(
            init_output.status.success(),
            "Failed to initialize data directory"
        );

        if let Some(config) = config {
            std::fs::write(data_dir.join("curio.toml"), config).expect("write config");
        }

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let base_url = format!("http://127.0.0.1:{}", port);

        let server_process = Command::new(binary())
            .args(["serve", "--data-dir"])
            .arg(data_dir)
            .args(["--host", "127.0.0.1", "--port"])
            .arg(port.to_string())
            .env_remove("CURIO_SIGNING_SECRET")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("start server");

        let client = reqwest::Client::new();
        Self::wait_for_ready(&client, &base_url).await;

        Self {
            temp_dir,
            base_url,
            client,
            server_process: Some(server_process),
        }
    }

    async fn wait_for_ready(client: &reqwest::Client, base_url: &str) {
        for _ in 0..50 {
            if client
                .get(format!("{}/health", base_url))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready");
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Files stored for an entity, whatever their extension.
    pub fn asset_files(&self, kind: &str, entity_id: &str) -> Vec<PathBuf> {
        let dir = self.data_dir().join("Assets").join(kind);
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem.eq_ignore_ascii_case(entity_id))
            })
            .collect()
    }

    pub async fn sign_up(&self, username: &str, password: &str, name: &str) -> TestUser {
        let resp = self
            .client
            .post(self.url("/api/Users/SignUp"))
            .json(&json!({"username": username, "password": password, "name": name}))
            .send()
            .await
            .expect("sign up");
        assert_eq!(resp.status(), 200, "sign up {username}");

        let body: Value = resp.json().await.expect("parse sign up response");
        TestUser {
            id: body["userId"].as_str().expect("user id").to_string(),
            token: body["token"].as_str().expect("token").to_string(),
        }
    }

    pub async fn create_category(&self, user: &TestUser, name: &str, image: Option<&[u8]>) -> Value {
        let mut form = reqwest::multipart::Form::new()
            .text("UserId", user.id.clone())
            .text("Name", name.to_string());
        if let Some(data) = image {
            form = form.part("Image", image_part(data, "cover.png"));
        }

        let resp = self
            .client
            .post(self.url("/api/Users/Categories"))
            .bearer_auth(&user.token)
            .multipart(form)
            .send()
            .await
            .expect("create category");
        assert_eq!(resp.status(), 200, "create category {name}");
        resp.json().await.expect("parse category response")
    }

    pub async fn create_artefact(
        &self,
        user: &TestUser,
        category_id: Option<&str>,
        index: u16,
        image: &[u8],
    ) -> Value {
        let mut form = reqwest::multipart::Form::new()
            .text("UserId", user.id.clone())
            .text("ArtefactIndex", index.to_string())
            .part("Image", image_part(image, "photo.jpg"));
        if let Some(category_id) = category_id {
            form = form.text("CategoryId", category_id.to_string());
        }

        let resp = self
            .client
            .post(self.url("/api/Users/Artefacts"))
            .bearer_auth(&user.token)
            .multipart(form)
            .send()
            .await
            .expect("create artefact");
        assert_eq!(resp.status(), 200, "create artefact");
        resp.json().await.expect("parse artefact response")
    }

    pub async fn get_json(&self, user: &TestUser, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(&user.token)
            .send()
            .await
            .expect("get");
        let status = resp.status().as_u16();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

pub fn image_part(data: &[u8], file_name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(data.to_vec()).file_name(file_name.to_string())
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut process) = self.server_process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
