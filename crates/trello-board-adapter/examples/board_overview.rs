/*
[INPUT]:  TRELLO_API_KEY / TRELLO_API_TOKEN environment variables
[OUTPUT]: Member info, open boards and one board's lists/cards
[POS]:    Examples - read-only tour of the client
[UPDATE]: When adding new read endpoints
*/

use trello_board_adapter::*;

/// Example: discover boards and fetch one of them through the batch endpoint
#[tokio::main]
async fn main() {
    println!("=== Trello Board Overview Example ===\n");

    let (Ok(api_key), Ok(api_token)) = (
        std::env::var("TRELLO_API_KEY"),
        std::env::var("TRELLO_API_TOKEN"),
    ) else {
        eprintln!("Set TRELLO_API_KEY and TRELLO_API_TOKEN first");
        return;
    };

    let client = match TrelloClient::new() {
        Ok(c) => c.with_credentials(Credentials::new(api_key, api_token)),
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };

    match client.get_member("me").await {
        Ok(member) => println!("✓ Signed in as {} ({})", member.full_name, member.username),
        Err(e) => {
            println!("✗ Error: {}", e);
            return;
        }
    }

    let boards = match client.list_boards(BoardFilter::Open).await {
        Ok(boards) => boards,
        Err(e) => {
            println!("✗ Error: {}", e);
            return;
        }
    };
    for board in &boards {
        println!("  {}  {}", board.id, board.name);
    }

    let Some(first) = boards.first() else {
        println!("\nNo open boards");
        return;
    };

    println!("\nBatch-fetching {}...", first.name);
    let requests = vec![
        BatchRequest::get_board(&first.id, BOARD_FIELDS),
        BatchRequest::get_lists(&first.id, LIST_FIELDS, ListFilter::Open),
        BatchRequest::get_cards(&first.id, CARD_FIELDS),
    ];
    match client.fetch_batch(&requests).await {
        Ok(responses) => {
            for (request, response) in requests.iter().zip(responses) {
                println!(
                    "  {} -> status {} success={}",
                    request.relative_url(),
                    response.status,
                    response.is_success()
                );
            }
        }
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Board overview example complete");
}
