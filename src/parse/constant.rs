/**
 * Scanner が認識する予約 token の一覧。
 * Scanner は先頭から順に prefix match を試すため、並び順もこの定数の contract の一部である。
 * 複数文字の演算子 (">=" など) は、その prefix となる 1 文字の演算子 (">" など) より前に、
 * 2 単語 keyword ("GROUP BY" など) は単語単位に分解せず丸ごと並べること。
 */
pub const RESERVED_WORDS: [&str; 21] = [
    "(", ")", ">=", "<=", "!=", ",", "=", ">", "<", "SELECT", "INSERT", "INTO", "VALUES",
    "UPDATE", "DELETE", "WHERE", "FROM", "SET", "GROUP BY", "ORDER BY", "HAVING",
];
