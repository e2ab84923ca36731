//! Esquema Diesel (declarado manualmente). Reemplazable con `diesel print-schema`.

diesel::table! {
    games (id) {
        id -> Uuid,
        team1_name -> Text,
        team2_name -> Text,
        starting_possession -> Text,
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    players (id) {
        id -> Uuid,
        game_id -> Uuid,
        name -> Text,
        team -> Text,
    }
}

diesel::table! {
    game_event_log (game_id, seq) {
        game_id -> Uuid,
        seq -> BigInt,
        event_id -> Uuid,
        ts -> Timestamptz,
        event_type -> Text,
        clock_seconds -> Integer,
        possession -> Text,
        payload -> Jsonb,
    }
}

diesel::table! {
    rejected_submissions (id) {
        id -> BigInt,
        game_id -> Uuid,
        error_class -> Text,
        details -> Nullable<Jsonb>,
        ts -> Timestamptz,
    }
}

diesel::joinable!(players -> games (game_id));

diesel::allow_tables_to_appear_in_same_query!(
    games,
    players,
    game_event_log,
    rejected_submissions,
);
