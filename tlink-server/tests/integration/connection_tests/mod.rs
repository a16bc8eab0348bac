mod test_unknown_connection_dropped;
