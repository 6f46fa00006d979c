use anyhow::Result;
use edgegrid::eg1::{Credential, RequestSigner, StaticCredentialProvider};
use edgegrid::{Context, Signer};
use http::header::AUTHORIZATION;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().is_test(false).try_init();

    let cred = Credential::new(
        "akab-client-token-xxx-xxxxxxxxxxxxxxxx",
        "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx=",
        "akab-access-token-xxx-xxxxxxxxxxxxxxxx",
    )
    .with_host("akaa-baseurl-xxxxxxxxxxx-xxxxxxxxxxxxx.luna.akamaiapis.net")
    .with_headers_to_sign(["X-Test1"]);

    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::from(cred),
        RequestSigner::new(),
    );

    let mut req = http::Request::post("/papi/v1/search/find-by-value")
        .header("X-Test1", "  some   value ")
        .body(br#"{"propertyName":"example"}"#.to_vec())?;
    signer.sign_request(&mut req).await?;

    println!("{} {}", req.method(), req.uri());
    println!("{}", req.headers()[AUTHORIZATION].to_str()?);
    Ok(())
}
