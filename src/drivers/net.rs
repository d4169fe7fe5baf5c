// FarmWatch — WiFi + HTTP Uplink
//
// Station-mode WiFi brought up once at boot and a JSON POST per snapshot.
// A fresh connection is opened for every request so a dropped link only
// costs the one upload.

use core::time::Duration;

use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use embedded_svc::io::Write;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration as WifiCfg, EspWifi};

use crate::config::UPLINK_TIMEOUT_MS;
use crate::uplink::Uplink;

pub fn connect_wifi(
    modem: Modem,
    ssid: &str,
    pass: &str,
) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    wifi.set_configuration(&WifiCfg::Client(ClientConfiguration {
        ssid: ssid
            .try_into()
            .map_err(|_| anyhow::anyhow!("WiFi SSID too long"))?,
        password: pass
            .try_into()
            .map_err(|_| anyhow::anyhow!("WiFi password too long"))?,
        ..Default::default()
    }))?;
    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    log::info!("WiFi connected to '{ssid}', IP {}", ip_info.ip);
    Ok(wifi)
}

pub struct HttpUplink {
    url: String,
}

impl HttpUplink {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string() }
    }
}

impl Uplink for HttpUplink {
    fn publish(&mut self, body: &str) -> anyhow::Result<()> {
        let config = HttpConfiguration {
            timeout: Some(Duration::from_millis(UPLINK_TIMEOUT_MS)),
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&config)
            .map_err(|e| anyhow::anyhow!("HTTP connection failed: {e:?}"))?;
        let mut client = Client::wrap(connection);

        let length = body.len().to_string();
        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", length.as_str()),
            ("Connection", "close"),
        ];
        let mut request = client
            .request(Method::Post, &self.url, &headers)
            .map_err(|e| anyhow::anyhow!("request creation failed: {e:?}"))?;
        request
            .write_all(body.as_bytes())
            .map_err(|e| anyhow::anyhow!("request body write failed: {e:?}"))?;
        request
            .flush()
            .map_err(|e| anyhow::anyhow!("request flush failed: {e:?}"))?;

        let response = request
            .submit()
            .map_err(|e| anyhow::anyhow!("request submit failed: {e:?}"))?;
        let status = response.status();
        if !(200..300).contains(&status) {
            anyhow::bail!("HTTP {status}");
        }
        log::debug!("uplink: HTTP {status}");
        Ok(())
    }
}
