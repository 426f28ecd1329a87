/*!

This is the long-form manual for `bracket_ranking` and `tierbracket`.

## Brackets

A bracket is built once per session from the items to rank. The items are shuffled and
seated in the first round, two per matchup. When the number of items is not a power of
two, the bracket is padded with empty slots: an item without an opponent gets a *bye* and
moves to the next round without a vote. Byes can chain over several rounds, for example
with 5 items in an 8 slot bracket: one first round item gets a bye, then meets nobody in
the second round either.

| items | rounds | matchups | empty slots |
|-------|--------|----------|-------------|
| 2     | 1      | 1        | 0           |
| 3     | 2      | 3        | 1           |
| 5     | 3      | 7        | 3           |
| 8     | 3      | 7        | 0           |
| 12    | 4      | 15       | 4           |

## Voting

Participants vote on the matchups of the current round. A participant has one vote per
matchup; voting again replaces the previous choice. When the round is closed, each
matchup goes to the item with the most votes. Ties, including matchups nobody voted on,
are settled with a coin flip. Winners then move to their slot in the next round: even
positions feed slot A, odd positions feed slot B.

Rounds are always closed in order, and a round is applied completely or not at all.

## Ranking

Once the final is decided, the ranking is rebuilt by *backtracking*:

1. the champion comes first, then the finalist,
2. every item is followed by the opponents it eliminated, the ones eliminated in later
   rounds first,
3. items that never lost a real match (byes) come last.

This ranks an item that lost early against the future champion above an item that lost
early against a weak opponent.

While the bracket is still being played, the ranking is coarser: items are sorted by the
furthest round they reached, keeping the input order among equals.

## Tiers

The ranking is split into tiers of equal size, the first tiers taking one more item when
the division is not exact. With the default of 5 tiers, they are named `S`, `A`, `B`,
`C` and `D`.

## Session files

The `tierbracket` program keeps a session in JSON files.

The bracket file is written once by `tierbracket generate` and updated by
`tierbracket advance`:

```json
{
  "sessionId": "movie-night",
  "rounds": 2,
  "items": ["Alien", "Brazil", "Clue"],
  "matchups": [
    {"round": 1, "position": 0, "itemAId": "Clue", "itemBId": "Alien", "winnerId": null},
    {"round": 1, "position": 1, "itemAId": "Brazil", "itemBId": null, "winnerId": "Brazil"},
    {"round": 2, "position": 0, "itemAId": null, "itemBId": "Brazil", "winnerId": null}
  ]
}
```

The votes file is a list of votes, updated by `tierbracket vote`:

```json
[
  {"round": 1, "position": 0, "participantId": "sam", "chosenItemId": "Alien"}
]
```

The optional configuration file passed with `--config`:

```json
{
  "sessionName": "movie-night",
  "joinCode": "K4X9",
  "rules": {
    "tierCount": 4,
    "tiebreakMode": "seeded",
    "randomSeed": "1234"
  }
}
```

`tiebreakMode` is `random` (the default) or `seeded`. In seeded mode, the seed is
`randomSeed` if present, otherwise it is derived from `joinCode`.

*/
