use api::{ApiClient, ApiConfig};
use booking::{client::Client, store::EntityStore};
use model::{reservation::ReservationDraft, ExampleData};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = ApiConfig::env().unwrap_or_else(|why| {
        println!("No backend configured ({why}), using http://localhost:3001.");
        ApiConfig::new("http://localhost:3001")
    });
    let gateway = ApiClient::new(config).unwrap();
    let client = Client::new(gateway, EntityStore::seeded());

    let locations = client.locations().await.unwrap();
    println!(
        "locations: {}",
        serde_json::to_string_pretty(&locations).unwrap()
    );

    let rooms = client.room_overviews().await.unwrap();
    println!("rooms: {}", serde_json::to_string_pretty(&rooms).unwrap());

    let created = client
        .create_reservation(ReservationDraft::example_data())
        .await;
    match created {
        Ok(reservation) => println!(
            "created: {}",
            serde_json::to_string_pretty(&reservation).unwrap()
        ),
        Err(why) => println!("reservation rejected: {why}"),
    }
}
