table! {
    players (id) {
        id -> Int4,
        name -> Text,
        active -> Bool,
    }
}

table! {
    results (match_date, player_id) {
        match_date -> Date,
        player_id -> Int4,
        points -> Int4,
    }
}

table! {
    team_assignments (match_date, player_id) {
        match_date -> Date,
        player_id -> Int4,
        team -> Text,
        slot -> Int4,
        locked_at -> Timestamptz,
    }
}

joinable!(results -> players (player_id));
joinable!(team_assignments -> players (player_id));

allow_tables_to_appear_in_same_query!(
    players,
    results,
    team_assignments,
);
